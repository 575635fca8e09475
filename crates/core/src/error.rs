//! 에러 타입 — 도메인별 에러 정의

/// Lockgate 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LockgateError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 어드바이저리 조회/처리 에러
    #[error("audit error: {0}")]
    Audit(#[from] AuditError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 어드바이저리 조회/처리 에러
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// 레지스트리 요청 실패 (네트워크, 타임아웃, 비정상 상태 코드)
    #[error("registry query failed: {0}")]
    QueryFailed(String),

    /// 응답 본문이 인식 가능한 형태가 아님
    #[error("advisory response schema invalid: {0}")]
    SchemaInvalid(String),

    /// 요청 페이로드 인코딩 실패
    #[error("payload encoding failed: {0}")]
    PayloadEncoding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = LockgateError::Config(ConfigError::InvalidValue {
            field: "registry.url".to_owned(),
            reason: "must not be empty".to_owned(),
        });
        let msg = err.to_string();
        assert!(msg.contains("registry.url"));
        assert!(msg.contains("must not be empty"));
    }

    #[test]
    fn audit_error_display() {
        let err = LockgateError::Audit(AuditError::QueryFailed("connection refused".to_owned()));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn schema_error_display() {
        let err = AuditError::SchemaInvalid("neither shape matched".to_owned());
        assert!(err.to_string().contains("neither shape matched"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: LockgateError = io_err.into();
        assert!(matches!(err, LockgateError::Io(_)));
    }
}
