//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `lockgate_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(lockgate_core::metrics::SCANS_COMPLETED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 심각도 레이블 키 (info, low, moderate, high, critical)
pub const LABEL_SEVERITY: &str = "severity";

/// 조치 등급 레이블 키 (warn, fatal)
pub const LABEL_LEVEL: &str = "level";

// ─── Advisory Scanner 메트릭 ───────────────────────────────────────

/// 완료된 스캔 수 (counter)
pub const SCANS_COMPLETED_TOTAL: &str = "lockgate_scans_completed_total";

/// 매칭된 어드바이저리 수 (counter, label: level)
pub const ADVISORIES_MATCHED_TOTAL: &str = "lockgate_advisories_matched_total";

/// 레지스트리 요청 수 (counter)
pub const REGISTRY_REQUESTS_TOTAL: &str = "lockgate_registry_requests_total";

/// 레지스트리 재시도 수 (counter)
pub const REGISTRY_RETRIES_TOTAL: &str = "lockgate_registry_retries_total";

/// 실패하여 건너뛴 배치 수 (counter)
pub const BATCHES_FAILED_TOTAL: &str = "lockgate_batches_failed_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        SCANS_COMPLETED_TOTAL,
        "Total number of advisory scans completed"
    );
    describe_counter!(
        ADVISORIES_MATCHED_TOTAL,
        "Total number of matched advisory records produced"
    );
    describe_counter!(
        REGISTRY_REQUESTS_TOTAL,
        "Total number of bulk advisory requests issued to the registry"
    );
    describe_counter!(
        REGISTRY_RETRIES_TOTAL,
        "Total number of retried registry request attempts"
    );
    describe_counter!(
        BATCHES_FAILED_TOTAL,
        "Total number of query batches skipped after exhausting retries"
    );
}
