//! 재시도 실행기 — 지수 백오프를 적용한 제한 재시도
//!
//! [`RetryPolicy`]는 실패할 수 있는 비동기 작업을 시도 상한과
//! 지수 백오프(`base_delay * 2^(attempt-1)`)로 감쌉니다.
//!
//! 재시도는 전송 계열 에러에만 적용됩니다
//! ([`AdvisoryScannerError::is_retryable`] 참고). 스키마 에러는
//! 재시도해도 같은 결과가 나오므로 즉시 반환됩니다.

use std::future::Future;
use std::time::Duration;

use metrics::counter;
use tracing::warn;

use lockgate_core::metrics::REGISTRY_RETRIES_TOTAL;

use crate::error::AdvisoryScannerError;

/// 재시도 정책
///
/// `max_attempts`는 최초 시도를 포함한 전체 시도 횟수입니다.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// 새 재시도 정책을 생성합니다.
    ///
    /// `max_attempts`가 0이면 1로 보정합니다.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// 전체 시도 횟수를 반환합니다.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// n번째 시도 실패 후 대기할 지연을 반환합니다 (attempt는 1부터).
    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }

    /// 작업을 실행하고, 재시도 가능한 실패면 백오프 후 다시 시도합니다.
    ///
    /// # Returns
    ///
    /// 첫 성공 결과, 또는 시도 상한 도달/재시도 불가 에러 시 마지막 에러
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, AdvisoryScannerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AdvisoryScannerError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "registry request attempt failed, retrying"
                    );
                    counter!(REGISTRY_RETRIES_TOTAL).increment(1);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
