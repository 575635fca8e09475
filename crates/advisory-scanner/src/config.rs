//! 어드바이저리 스캐너 설정
//!
//! [`AdvisoryScannerConfig`]는 core의 [`RegistryConfig`](lockgate_core::config::RegistryConfig)에서
//! 파생되며, 스캐너가 사용하는 형태(Duration 변환 등)로 노출합니다.
//!
//! # 사용 예시
//!
//! ```
//! use lockgate_advisory_scanner::AdvisoryScannerConfig;
//!
//! // 기본값으로 생성
//! let config = AdvisoryScannerConfig::default();
//! config.validate().unwrap();
//!
//! // 빌더로 생성
//! use lockgate_advisory_scanner::AdvisoryScannerConfigBuilder;
//!
//! let config = AdvisoryScannerConfigBuilder::new()
//!     .registry_url("http://localhost:4873")
//!     .batch_size(50)
//!     .build()
//!     .unwrap();
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use lockgate_core::config::RegistryConfig;

use crate::error::AdvisoryScannerError;

/// 설정 상한값 상수
const MAX_TIMEOUT_MS: u64 = 600_000;
const MAX_BATCH_SIZE: usize = 10_000;
const MAX_RETRY_CEILING: u32 = 10;

/// 어드바이저리 스캐너 설정
///
/// # 필드
///
/// - **registry_url**: 벌크 어드바이저리 엔드포인트의 베이스 URL
/// - **timeout_ms**: 시도당 요청 타임아웃 (밀리초)
/// - **batch_size**: 한 요청에 담는 최대 (이름, 버전) 쌍 수
/// - **max_retries**: 전송 실패 시 최대 시도 횟수 (최초 시도 포함)
/// - **retry_base_delay_ms**: 지수 백오프 초기 지연 (밀리초)
/// - **max_description_len**: 결과 레코드 설명 최대 길이 (문자)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryScannerConfig {
    /// 레지스트리 베이스 URL
    pub registry_url: String,
    /// 시도당 요청 타임아웃 (밀리초)
    pub timeout_ms: u64,
    /// 요청당 최대 (이름, 버전) 쌍 수
    pub batch_size: usize,
    /// 최대 시도 횟수
    pub max_retries: u32,
    /// 지수 백오프 초기 지연 (밀리초)
    pub retry_base_delay_ms: u64,
    /// 설명 최대 길이 (문자)
    pub max_description_len: usize,
}

impl Default for AdvisoryScannerConfig {
    fn default() -> Self {
        Self::from_core(&RegistryConfig::default())
    }
}

impl AdvisoryScannerConfig {
    /// core의 `RegistryConfig`에서 스캐너 설정을 생성합니다.
    pub fn from_core(core: &RegistryConfig) -> Self {
        Self {
            registry_url: core.url.clone(),
            timeout_ms: core.timeout_ms,
            batch_size: core.batch_size,
            max_retries: core.max_retries,
            retry_base_delay_ms: core.retry_base_delay_ms,
            max_description_len: core.max_description_len,
        }
    }

    /// 시도당 타임아웃을 `Duration`으로 반환합니다.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// 백오프 초기 지연을 `Duration`으로 반환합니다.
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `registry_url`: 비어있지 않고 http(s) 스킴이어야 함
    /// - `timeout_ms`: 1-600000
    /// - `batch_size`: 1-10000
    /// - `max_retries`: 1-10
    pub fn validate(&self) -> Result<(), AdvisoryScannerError> {
        if self.registry_url.is_empty()
            || (!self.registry_url.starts_with("http://")
                && !self.registry_url.starts_with("https://"))
        {
            return Err(AdvisoryScannerError::Config {
                field: "registry_url".to_owned(),
                reason: "must be a non-empty http(s) URL".to_owned(),
            });
        }

        if self.timeout_ms == 0 || self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(AdvisoryScannerError::Config {
                field: "timeout_ms".to_owned(),
                reason: format!("must be 1-{MAX_TIMEOUT_MS}"),
            });
        }

        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(AdvisoryScannerError::Config {
                field: "batch_size".to_owned(),
                reason: format!("must be 1-{MAX_BATCH_SIZE}"),
            });
        }

        if self.max_retries == 0 || self.max_retries > MAX_RETRY_CEILING {
            return Err(AdvisoryScannerError::Config {
                field: "max_retries".to_owned(),
                reason: format!("must be 1-{MAX_RETRY_CEILING}"),
            });
        }

        if self.retry_base_delay_ms == 0 {
            return Err(AdvisoryScannerError::Config {
                field: "retry_base_delay_ms".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.max_description_len == 0 {
            return Err(AdvisoryScannerError::Config {
                field: "max_description_len".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(())
    }
}

/// [`AdvisoryScannerConfig`] 빌더
///
/// 유연한 설정 구성 및 빌드 시 유효성 검증을 제공합니다.
#[derive(Default)]
pub struct AdvisoryScannerConfigBuilder {
    config: AdvisoryScannerConfig,
}

impl AdvisoryScannerConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 레지스트리 베이스 URL을 설정합니다.
    pub fn registry_url(mut self, url: impl Into<String>) -> Self {
        self.config.registry_url = url.into();
        self
    }

    /// 시도당 타임아웃(밀리초)을 설정합니다.
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    /// 요청당 최대 쌍 수를 설정합니다.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// 최대 시도 횟수를 설정합니다.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// 백오프 초기 지연(밀리초)을 설정합니다.
    pub fn retry_base_delay_ms(mut self, ms: u64) -> Self {
        self.config.retry_base_delay_ms = ms;
        self
    }

    /// 설명 최대 길이를 설정합니다.
    pub fn max_description_len(mut self, len: usize) -> Self {
        self.config.max_description_len = len;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `AdvisoryScannerError::Config` 반환
    pub fn build(self) -> Result<AdvisoryScannerConfig, AdvisoryScannerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
