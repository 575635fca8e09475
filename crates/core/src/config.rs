//! 설정 관리 — lockgate.toml 파싱 및 런타임 설정
//!
//! [`LockgateConfig`]는 스캐너와 CLI가 공유하는 최상위 설정 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOCKGATE_REGISTRY_URL=...` 형식)
//! 3. 설정 파일 (`lockgate.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! 환경변수 값이 파싱되지 않으면 경고를 남기고 기존 값을 유지합니다.
//! 설정 실패로 스캔 자체가 막히지 않도록 하기 위한 동작입니다.
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), lockgate_core::error::LockgateError> {
//! use lockgate_core::config::LockgateConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LockgateConfig::load("lockgate.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LockgateConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LockgateError};

/// Lockgate 통합 설정
///
/// `lockgate.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LockgateConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 레지스트리 질의 설정
    #[serde(default)]
    pub registry: RegistryConfig,
}

impl LockgateConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LockgateError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LockgateError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LockgateError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LockgateError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LockgateError> {
        toml::from_str(toml_str).map_err(|e| {
            LockgateError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOCKGATE_{SECTION}_{FIELD}`
    /// 예: `LOCKGATE_REGISTRY_URL=https://registry.example.com`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOCKGATE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOCKGATE_GENERAL_LOG_FORMAT");

        // Registry
        override_string(&mut self.registry.url, "LOCKGATE_REGISTRY_URL");
        override_u64(&mut self.registry.timeout_ms, "LOCKGATE_REGISTRY_TIMEOUT_MS");
        override_usize(
            &mut self.registry.batch_size,
            "LOCKGATE_REGISTRY_BATCH_SIZE",
        );
        override_u32(
            &mut self.registry.max_retries,
            "LOCKGATE_REGISTRY_MAX_RETRIES",
        );
        override_u64(
            &mut self.registry.retry_base_delay_ms,
            "LOCKGATE_REGISTRY_RETRY_BASE_DELAY_MS",
        );
        override_usize(
            &mut self.registry.max_description_len,
            "LOCKGATE_REGISTRY_MAX_DESCRIPTION_LEN",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LockgateError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        self.registry.validate()?;

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 설정 상한값 상수
const MAX_TIMEOUT_MS: u64 = 600_000; // 10 minutes
const MAX_BATCH_SIZE: usize = 10_000;
const MAX_RETRY_CEILING: u32 = 10;
const MAX_RETRY_BASE_DELAY_MS: u64 = 60_000;
const MIN_DESCRIPTION_LEN: usize = 20;
const MAX_DESCRIPTION_LEN_LIMIT: usize = 10_000;

/// 레지스트리 질의 설정
///
/// # 필드
///
/// - **url**: 어드바이저리 벌크 엔드포인트의 베이스 URL
/// - **timeout_ms**: 요청당 타임아웃 (밀리초)
/// - **batch_size**: 한 요청에 담는 최대 (이름, 버전) 쌍 수
/// - **max_retries**: 전송 실패 시 최대 시도 횟수
/// - **retry_base_delay_ms**: 지수 백오프의 초기 지연 (밀리초)
/// - **max_description_len**: 결과 레코드 설명의 최대 길이 (문자)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// 레지스트리 베이스 URL
    pub url: String,
    /// 요청당 타임아웃 (밀리초)
    pub timeout_ms: u64,
    /// 요청당 최대 (이름, 버전) 쌍 수
    pub batch_size: usize,
    /// 최대 시도 횟수 (최초 시도 포함)
    pub max_retries: u32,
    /// 지수 백오프 초기 지연 (밀리초)
    pub retry_base_delay_ms: u64,
    /// 설명 최대 길이 (문자)
    pub max_description_len: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: "https://registry.npmjs.org".to_owned(),
            timeout_ms: 30_000,
            batch_size: 100,
            max_retries: 3,
            retry_base_delay_ms: 250,
            max_description_len: 200,
        }
    }
}

impl RegistryConfig {
    /// 레지스트리 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "registry.url".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "registry.url".to_owned(),
                reason: "must start with http:// or https://".to_owned(),
            });
        }

        if self.timeout_ms == 0 || self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::InvalidValue {
                field: "registry.timeout_ms".to_owned(),
                reason: format!("must be 1-{MAX_TIMEOUT_MS}"),
            });
        }

        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "registry.batch_size".to_owned(),
                reason: format!("must be 1-{MAX_BATCH_SIZE}"),
            });
        }

        if self.max_retries == 0 || self.max_retries > MAX_RETRY_CEILING {
            return Err(ConfigError::InvalidValue {
                field: "registry.max_retries".to_owned(),
                reason: format!("must be 1-{MAX_RETRY_CEILING}"),
            });
        }

        if self.retry_base_delay_ms == 0 || self.retry_base_delay_ms > MAX_RETRY_BASE_DELAY_MS {
            return Err(ConfigError::InvalidValue {
                field: "registry.retry_base_delay_ms".to_owned(),
                reason: format!("must be 1-{MAX_RETRY_BASE_DELAY_MS}"),
            });
        }

        if self.max_description_len < MIN_DESCRIPTION_LEN
            || self.max_description_len > MAX_DESCRIPTION_LEN_LIMIT
        {
            return Err(ConfigError::InvalidValue {
                field: "registry.max_description_len".to_owned(),
                reason: format!("must be {MIN_DESCRIPTION_LEN}-{MAX_DESCRIPTION_LEN_LIMIT}"),
            });
        }

        Ok(())
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}
