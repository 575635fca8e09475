//! 매칭 -- 버전 범위 판정과 심각도 분류
//!
//! 파이프라인의 순수 leaf 구성요소들입니다.
//!
//! - [`version`]: 확정 버전 vs 취약 범위 판정 (`is_affected`)
//! - [`severity`]: 심각도 레이블/점수 -> 조치 등급 (`level_for`,
//!   `priority_of`, `is_score_fatal`)

pub mod severity;
pub mod version;

pub use severity::{FATAL_SCORE_THRESHOLD, is_score_fatal, level_for, priority_of};
pub use version::is_affected;
