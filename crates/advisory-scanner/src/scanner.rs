//! 어드바이저리 스캐너 오케스트레이터 -- 전체 스캔 흐름 관리
//!
//! [`AdvisoryScanner`]는 질의 클라이언트와 프로세서를 묶어 하나의
//! 스캔 진입점을 제공합니다.
//!
//! # 내부 아키텍처
//!
//! ```text
//! Vec<PackageRef> --> AdvisoryQueryClient --> Vec<RawAdvisory>
//!                          |                        |
//!                  RegistryTransport         AdvisoryProcessor
//!                    (retry, gzip)                  |
//!                                          Vec<MatchedAdvisory>
//!                                                   |
//!                                              AuditReport
//! ```
//!
//! # 실패 격리
//!
//! [`AdvisoryScanner::audit`]는 파이프라인의 유일한 최상위 실패 경계입니다.
//! 내부 어디에서 실패하든 에러는 여기서 한 번 로그되고 빈 리포트로
//! 변환됩니다. 스캐너 장애가 검사 대상인 설치 자체를 막아서는 안 됩니다.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use metrics::counter;
use tracing::{info, warn};

use lockgate_core::metrics::{ADVISORIES_MATCHED_TOTAL, LABEL_LEVEL, SCANS_COMPLETED_TOTAL};
use lockgate_core::types::{AdvisoryLevel, MatchedAdvisory, PackageRef};

use crate::config::AdvisoryScannerConfig;
use crate::error::AdvisoryScannerError;
use crate::processor::AdvisoryProcessor;
use crate::query::{AdvisoryQueryClient, payload};
use crate::transport::{HttpRegistryTransport, RegistryTransport};

/// 한 번의 스캔 전체 결과
#[derive(Debug, Clone)]
pub struct AuditReport {
    /// 스캔 고유 ID
    pub scan_id: String,
    /// 입력 패키지 수 (중복 포함)
    pub total_packages: usize,
    /// 중복 제거 후 고유 `name@version` 쌍 수
    pub unique_packages: usize,
    /// 매칭된 어드바이저리 레코드
    pub advisories: Vec<MatchedAdvisory>,
    /// 스캔 시각
    pub scanned_at: SystemTime,
}

impl AuditReport {
    /// 빈 리포트를 생성합니다 (실패 격리 경계에서 사용).
    fn empty(total_packages: usize) -> Self {
        Self {
            scan_id: uuid::Uuid::new_v4().to_string(),
            total_packages,
            unique_packages: 0,
            advisories: Vec::new(),
            scanned_at: SystemTime::now(),
        }
    }

    /// 매칭된 레코드 수를 반환합니다.
    pub fn advisory_count(&self) -> usize {
        self.advisories.len()
    }

    /// 조치 등급별 레코드 수를 반환합니다.
    pub fn level_counts(&self) -> LevelCounts {
        let mut counts = LevelCounts::default();
        for advisory in &self.advisories {
            match advisory.level {
                AdvisoryLevel::Fatal => counts.fatal += 1,
                AdvisoryLevel::Warn => counts.warn += 1,
            }
        }
        counts
    }

    /// 설치 차단 등급 레코드가 있는지 반환합니다.
    pub fn has_fatal(&self) -> bool {
        self.advisories.iter().any(|a| a.level.is_fatal())
    }
}

/// 조치 등급별 레코드 개수
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelCounts {
    pub fatal: usize,
    pub warn: usize,
}

impl LevelCounts {
    /// 전체 레코드 수를 반환합니다.
    pub fn total(&self) -> usize {
        self.fatal + self.warn
    }
}

/// 어드바이저리 스캐너 오케스트레이터
pub struct AdvisoryScanner<T: RegistryTransport> {
    /// 질의 클라이언트
    client: AdvisoryQueryClient<T>,
    /// 레코드 프로세서
    processor: AdvisoryProcessor,
    /// 완료된 스캔 수
    scans_completed: AtomicU64,
    /// 매칭된 어드바이저리 수
    advisories_found: AtomicU64,
}

impl AdvisoryScanner<HttpRegistryTransport> {
    /// HTTP 전송으로 스캐너를 생성하는 편의 함수입니다.
    pub fn with_http(config: AdvisoryScannerConfig) -> Result<Self, AdvisoryScannerError> {
        let transport = Arc::new(HttpRegistryTransport::new(&config)?);
        AdvisoryScannerBuilder::new()
            .config(config)
            .transport(transport)
            .build()
    }
}

impl<T: RegistryTransport> AdvisoryScanner<T> {
    /// 완료된 스캔 수를 반환합니다.
    pub fn scans_completed(&self) -> u64 {
        self.scans_completed.load(Ordering::Relaxed)
    }

    /// 지금까지 매칭된 어드바이저리 수를 반환합니다.
    pub fn advisories_found(&self) -> u64 {
        self.advisories_found.load(Ordering::Relaxed)
    }

    /// 패키지 목록을 스캔하여 리포트를 반환합니다.
    ///
    /// 이 함수는 실패하지 않습니다. 내부 에러는 한 번 로그된 뒤
    /// 빈 리포트로 변환됩니다 — 호스트 입장에서 스캐너 장애는
    /// "어드바이저리 없음"과 구별되지 않습니다.
    pub async fn audit(&self, packages: &[PackageRef]) -> AuditReport {
        match self.audit_strict(packages).await {
            Ok(report) => report,
            Err(err) => {
                warn!(error = %err, "advisory scan failed, returning empty result");
                AuditReport::empty(packages.len())
            }
        }
    }

    /// 에러를 전파하는 스캔 변형입니다.
    ///
    /// CLI의 진단 모드와 테스트에서 사용합니다. 호스트 경로는
    /// [`audit`](Self::audit)를 사용해야 합니다.
    pub async fn audit_strict(
        &self,
        packages: &[PackageRef],
    ) -> Result<AuditReport, AdvisoryScannerError> {
        let unique_packages = payload::dedup_packages(packages).len();

        let raw = self.client.query_advisories(packages).await?;
        let matched = self.processor.process(&raw, packages);

        for record in &matched {
            counter!(ADVISORIES_MATCHED_TOTAL, LABEL_LEVEL => record.level.to_string())
                .increment(1);
        }
        counter!(SCANS_COMPLETED_TOTAL).increment(1);

        self.scans_completed.fetch_add(1, Ordering::Relaxed);
        let matched_u64 = u64::try_from(matched.len()).unwrap_or(u64::MAX);
        self.advisories_found.fetch_add(matched_u64, Ordering::Relaxed);

        info!(
            packages = packages.len(),
            unique = unique_packages,
            raw_advisories = raw.len(),
            matched = matched.len(),
            "advisory scan completed"
        );

        Ok(AuditReport {
            scan_id: uuid::Uuid::new_v4().to_string(),
            total_packages: packages.len(),
            unique_packages,
            advisories: matched,
            scanned_at: SystemTime::now(),
        })
    }
}

/// [`AdvisoryScanner`] 빌더
pub struct AdvisoryScannerBuilder<T: RegistryTransport> {
    config: AdvisoryScannerConfig,
    transport: Option<Arc<T>>,
}

impl<T: RegistryTransport> AdvisoryScannerBuilder<T> {
    /// 기본 설정을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: AdvisoryScannerConfig::default(),
            transport: None,
        }
    }

    /// 스캐너 설정을 지정합니다.
    pub fn config(mut self, config: AdvisoryScannerConfig) -> Self {
        self.config = config;
        self
    }

    /// 레지스트리 전송 구현을 지정합니다.
    pub fn transport(mut self, transport: Arc<T>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// 설정을 검증하고 스캐너를 빌드합니다.
    ///
    /// # Errors
    ///
    /// 설정이 유효하지 않거나 전송이 지정되지 않으면
    /// `AdvisoryScannerError::Config` 반환
    pub fn build(self) -> Result<AdvisoryScanner<T>, AdvisoryScannerError> {
        self.config.validate()?;

        let transport = self
            .transport
            .ok_or_else(|| AdvisoryScannerError::Config {
                field: "transport".to_owned(),
                reason: "a registry transport is required".to_owned(),
            })?;

        let client = AdvisoryQueryClient::new(transport, &self.config);
        let processor = AdvisoryProcessor::new(self.config.max_description_len);

        Ok(AdvisoryScanner {
            client,
            processor,
            scans_completed: AtomicU64::new(0),
            advisories_found: AtomicU64::new(0),
        })
    }
}

impl<T: RegistryTransport> Default for AdvisoryScannerBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
