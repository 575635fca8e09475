//! 어드바이저리 질의 클라이언트 -- 중복 제거, 배치, 전송, 디코드
//!
//! [`AdvisoryQueryClient`]는 입력 패키지 목록을 벌크 어드바이저리 질의로
//! 변환하고 응답을 원시 어드바이저리 목록으로 되돌립니다.
//!
//! # 질의 흐름
//!
//! 1. `name@version` 기준 중복 제거 (첫 등장 순서 유지)
//! 2. 이름 -> 고유 버전 목록 그룹화
//! 3. 고유 쌍이 `batch_size`를 넘으면 연속 배치로 분할, 순차 전송
//! 4. JSON 직렬화 + gzip 압축 후 [`RetryPolicy`] 아래에서 전송
//! 5. 응답 본문을 두 형태 검증기로 디코드, 매핑을 목록으로 평탄화
//!
//! 배치가 둘 이상일 때 한 배치의 실패는 로그를 남기고 건너뜁니다.
//! 나머지 배치는 계속 실행되어 부분 결과를 반환합니다. 배치가 하나뿐이면
//! 실패가 호출자에게 그대로 전파됩니다.

pub mod payload;
pub mod response;

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, info, warn};

use lockgate_core::metrics::{BATCHES_FAILED_TOTAL, REGISTRY_REQUESTS_TOTAL};
use lockgate_core::types::PackageRef;

use crate::config::AdvisoryScannerConfig;
use crate::error::AdvisoryScannerError;
use crate::retry::RetryPolicy;
use crate::transport::RegistryTransport;
use crate::types::RawAdvisory;

/// 어드바이저리 질의 클라이언트
///
/// 전송은 [`RegistryTransport`] 구현에 위임하며, 전송 실패는
/// [`RetryPolicy`]가 관리합니다.
pub struct AdvisoryQueryClient<T: RegistryTransport> {
    transport: Arc<T>,
    retry: RetryPolicy,
    batch_size: usize,
}

impl<T: RegistryTransport> AdvisoryQueryClient<T> {
    /// 새 질의 클라이언트를 생성합니다.
    pub fn new(transport: Arc<T>, config: &AdvisoryScannerConfig) -> Self {
        Self {
            transport,
            retry: RetryPolicy::new(config.max_retries, config.retry_base_delay()),
            batch_size: config.batch_size.max(1),
        }
    }

    /// 패키지 목록에 해당하는 어드바이저리를 조회합니다.
    ///
    /// 빈 입력은 네트워크 호출 없이 빈 결과를 반환합니다.
    ///
    /// # Errors
    ///
    /// 단일 배치 질의의 전송/스키마 실패는 그대로 전파됩니다.
    /// 다중 배치에서는 실패한 배치만 건너뛰고 나머지 결과를 반환합니다.
    pub async fn query_advisories(
        &self,
        packages: &[PackageRef],
    ) -> Result<Vec<RawAdvisory>, AdvisoryScannerError> {
        if packages.is_empty() {
            debug!("no packages to query, skipping advisory lookup");
            return Ok(Vec::new());
        }

        let unique = payload::dedup_packages(packages);
        debug!(
            before = packages.len(),
            after = unique.len(),
            "deduplicated packages for advisory query"
        );

        let batches: Vec<&[&PackageRef]> = unique.chunks(self.batch_size).collect();
        let batch_count = batches.len();
        let mut advisories = Vec::new();

        for (index, batch) in batches.into_iter().enumerate() {
            match self.query_batch(batch).await {
                Ok(mut found) => {
                    info!(
                        batch = index + 1,
                        batches = batch_count,
                        packages = batch.len(),
                        advisories = found.len(),
                        "advisory batch completed"
                    );
                    advisories.append(&mut found);
                }
                Err(err) if batch_count > 1 => {
                    warn!(
                        batch = index + 1,
                        batches = batch_count,
                        error = %err,
                        "advisory batch failed, skipping"
                    );
                    counter!(BATCHES_FAILED_TOTAL).increment(1);
                }
                Err(err) => return Err(err),
            }
        }

        Ok(advisories)
    }

    /// 단일 배치를 전송하고 응답을 디코드합니다.
    async fn query_batch(
        &self,
        batch: &[&PackageRef],
    ) -> Result<Vec<RawAdvisory>, AdvisoryScannerError> {
        let grouped = payload::group_by_name(batch);
        let body = payload::encode_payload(&grouped)?;

        counter!(REGISTRY_REQUESTS_TOTAL).increment(1);
        let response = self
            .retry
            .run(|| self.transport.post_bulk(body.clone()))
            .await?;

        let map = response::validate(&response)?;
        Ok(map.into_values().collect())
    }
}
