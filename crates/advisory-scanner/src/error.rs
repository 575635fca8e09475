//! 어드바이저리 스캐너 에러 타입
//!
//! [`AdvisoryScannerError`]는 스캐너 모듈 내에서 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<AdvisoryScannerError> for LockgateError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 자연스럽게 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **전송**: `Transport`, `Status` — 재시도 대상
//! - **스키마**: `Schema` — 재시도해도 고쳐지지 않으므로 즉시 전파
//! - **페이로드**: `Compression`, `Serialization`
//! - **설정**: `Config`

use lockgate_core::error::{AuditError, LockgateError};

/// 어드바이저리 스캐너 도메인 에러
///
/// # 에러 변환
///
/// `From<AdvisoryScannerError> for LockgateError` 구현으로
/// 호스트/CLI에서 사용하는 최상위 에러 타입으로 자동 변환됩니다.
#[derive(Debug, thiserror::Error)]
pub enum AdvisoryScannerError {
    /// 네트워크 전송 실패 (연결 실패, 타임아웃 등)
    #[error("registry transport error: {0}")]
    Transport(String),

    /// 레지스트리가 비정상 상태 코드를 반환함
    #[error("registry returned status {status}")]
    Status {
        /// HTTP 상태 코드
        status: u16,
    },

    /// 응답 본문이 인식 가능한 두 형태 중 어느 것도 아님
    ///
    /// 두 형태의 실패 사유를 모두 보존하여 어떤 시도가 왜 실패했는지
    /// 진단할 수 있게 합니다.
    #[error("advisory response matched neither shape: direct map ({direct}); wrapped ({wrapped})")]
    Schema {
        /// id -> advisory 직접 매핑 형태의 실패 사유
        direct: String,
        /// `advisories` 필드로 감싼 형태의 실패 사유
        wrapped: String,
    },

    /// 요청 페이로드 gzip 압축 실패
    #[error("payload compression failed: {0}")]
    Compression(String),

    /// 요청 페이로드 직렬화 실패
    #[error("payload serialization failed: {0}")]
    Serialization(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl From<AdvisoryScannerError> for LockgateError {
    fn from(err: AdvisoryScannerError) -> Self {
        match err {
            AdvisoryScannerError::Transport(msg) => {
                LockgateError::Audit(AuditError::QueryFailed(msg))
            }
            AdvisoryScannerError::Status { status } => LockgateError::Audit(
                AuditError::QueryFailed(format!("registry returned status {status}")),
            ),
            AdvisoryScannerError::Schema { direct, wrapped } => {
                LockgateError::Audit(AuditError::SchemaInvalid(format!(
                    "direct map ({direct}); wrapped ({wrapped})"
                )))
            }
            AdvisoryScannerError::Compression(msg) => {
                LockgateError::Audit(AuditError::PayloadEncoding(msg))
            }
            AdvisoryScannerError::Serialization(msg) => {
                LockgateError::Audit(AuditError::PayloadEncoding(msg))
            }
            AdvisoryScannerError::Config { field, reason } => {
                LockgateError::Config(lockgate_core::error::ConfigError::InvalidValue {
                    field,
                    reason,
                })
            }
        }
    }
}

impl AdvisoryScannerError {
    /// 재시도로 해결될 수 있는 에러인지 반환합니다.
    ///
    /// 전송 실패와 비정상 상태 코드만 재시도 대상입니다.
    /// 스키마/페이로드 에러는 재시도해도 같은 결과가 나옵니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}
