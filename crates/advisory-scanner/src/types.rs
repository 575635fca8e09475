//! 와이어 타입 — 레지스트리 응답의 어드바이저리 레코드
//!
//! [`RawAdvisory`]는 벌크 어드바이저리 응답에서 역직렬화되는 원시 레코드입니다.
//! 수신 후에는 불변으로 취급됩니다.
//!
//! # 응답 레코드 예시
//!
//! ```json
//! {
//!   "id": 1065,
//!   "title": "Prototype Pollution",
//!   "module_name": "lodash",
//!   "severity": "high",
//!   "vulnerable_versions": "<4.17.21",
//!   "url": "https://npmjs.com/advisories/1065",
//!   "overview": "...",
//!   "recommendation": "Upgrade to 4.17.21 or later.",
//!   "cvss": { "score": 7.4, "vectorString": "CVSS:3.1/..." }
//! }
//! ```
//!
//! `id`는 정수와 문자열 양쪽 모두 유효한 식별자이며 역직렬화 시점에
//! 문자열로 정규화됩니다. 알려지지 않은 필드는 무시합니다.

use std::fmt;

use serde::{Deserialize, Deserializer};

use lockgate_core::types::AdvisorySeverity;

/// 레지스트리가 반환한 원시 어드바이저리 레코드
#[derive(Debug, Clone, Deserialize)]
pub struct RawAdvisory {
    /// 어드바이저리 ID (문자열 또는 정수 — 문자열로 정규화)
    #[serde(deserialize_with = "id_to_string")]
    pub id: String,
    /// 어드바이저리 제목
    pub title: String,
    /// 심각도 레이블 (닫힌 5단계 집합)
    pub severity: AdvisorySeverity,
    /// 취약 버전 범위 표현식 (예: `>=1.0.0 <2.0.0`)
    pub vulnerable_versions: String,
    /// 어드바이저리 상세 URL
    pub url: String,
    /// 대상 패키지 이름
    #[serde(default)]
    pub name: Option<String>,
    /// 대상 패키지 이름 (구식 필드, `name`이 없을 때 폴백)
    #[serde(default)]
    pub module_name: Option<String>,
    /// 취약점 개요
    #[serde(default)]
    pub overview: Option<String>,
    /// 권장 조치
    #[serde(default)]
    pub recommendation: Option<String>,
    /// CVSS 점수 정보
    #[serde(default)]
    pub cvss: Option<CvssInfo>,
}

/// CVSS 점수 정보
///
/// 심각도 레이블이 없을 때 사용할 수 있는 독립 수치 신호입니다.
#[derive(Debug, Clone, Deserialize)]
pub struct CvssInfo {
    /// 0-10 스케일 점수
    #[serde(default)]
    pub score: Option<f64>,
}

impl RawAdvisory {
    /// 어드바이저리의 대상 패키지 이름을 해석합니다.
    ///
    /// `name` 필드를 우선하고, 없으면 구식 `module_name` 필드로 폴백합니다.
    /// 둘 다 없으면 `None` — 이 어드바이저리는 어떤 패키지에도 귀속할 수 없습니다.
    pub fn subject_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.module_name.as_deref().filter(|n| !n.is_empty()))
    }
}

impl fmt::Display for RawAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "advisory {} [{}] {} ({})",
            self.id,
            self.severity,
            self.title,
            self.subject_name().unwrap_or("?"),
        )
    }
}

/// `id` 필드를 문자열 또는 정수 양쪽에서 받아 문자열로 정규화합니다.
fn id_to_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Num(i64),
        Str(String),
    }

    match IdRepr::deserialize(deserializer)? {
        IdRepr::Num(n) => Ok(n.to_string()),
        IdRepr::Str(s) => Ok(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<RawAdvisory, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn deserializes_with_numeric_id() {
        let advisory = parse(
            r#"{
                "id": 1065,
                "title": "Prototype Pollution",
                "severity": "high",
                "vulnerable_versions": "<4.17.21",
                "url": "https://npmjs.com/advisories/1065"
            }"#,
        )
        .unwrap();
        assert_eq!(advisory.id, "1065");
        assert_eq!(advisory.severity, AdvisorySeverity::High);
    }

    #[test]
    fn deserializes_with_string_id() {
        let advisory = parse(
            r#"{
                "id": "GHSA-jf85-cpcp-j695",
                "title": "Prototype Pollution",
                "severity": "critical",
                "vulnerable_versions": "*",
                "url": "https://github.com/advisories/GHSA-jf85-cpcp-j695"
            }"#,
        )
        .unwrap();
        assert_eq!(advisory.id, "GHSA-jf85-cpcp-j695");
    }

    #[test]
    fn tolerates_unknown_fields() {
        let advisory = parse(
            r#"{
                "id": 1,
                "title": "t",
                "severity": "low",
                "vulnerable_versions": "*",
                "url": "https://x",
                "github_advisory_id": "GHSA-xxxx",
                "found_by": { "name": "someone" }
            }"#,
        )
        .unwrap();
        assert_eq!(advisory.id, "1");
    }

    #[test]
    fn rejects_missing_title() {
        let result = parse(
            r#"{
                "id": 1,
                "severity": "low",
                "vulnerable_versions": "*",
                "url": "https://x"
            }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_severity_label() {
        let result = parse(
            r#"{
                "id": 1,
                "title": "t",
                "severity": "catastrophic",
                "vulnerable_versions": "*",
                "url": "https://x"
            }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_missing_vulnerable_versions() {
        let result = parse(
            r#"{
                "id": 1,
                "title": "t",
                "severity": "low",
                "url": "https://x"
            }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn subject_name_prefers_name_field() {
        let advisory = parse(
            r#"{
                "id": 1,
                "title": "t",
                "severity": "low",
                "vulnerable_versions": "*",
                "url": "https://x",
                "name": "primary",
                "module_name": "legacy"
            }"#,
        )
        .unwrap();
        assert_eq!(advisory.subject_name(), Some("primary"));
    }

    #[test]
    fn subject_name_falls_back_to_module_name() {
        let advisory = parse(
            r#"{
                "id": 1,
                "title": "t",
                "severity": "low",
                "vulnerable_versions": "*",
                "url": "https://x",
                "module_name": "legacy"
            }"#,
        )
        .unwrap();
        assert_eq!(advisory.subject_name(), Some("legacy"));
    }

    #[test]
    fn subject_name_none_when_both_absent() {
        let advisory = parse(
            r#"{
                "id": 1,
                "title": "t",
                "severity": "low",
                "vulnerable_versions": "*",
                "url": "https://x"
            }"#,
        )
        .unwrap();
        assert_eq!(advisory.subject_name(), None);
    }

    #[test]
    fn subject_name_skips_empty_name() {
        let advisory = parse(
            r#"{
                "id": 1,
                "title": "t",
                "severity": "low",
                "vulnerable_versions": "*",
                "url": "https://x",
                "name": "",
                "module_name": "legacy"
            }"#,
        )
        .unwrap();
        assert_eq!(advisory.subject_name(), Some("legacy"));
    }

    #[test]
    fn cvss_score_parses() {
        let advisory = parse(
            r#"{
                "id": 1,
                "title": "t",
                "severity": "high",
                "vulnerable_versions": "*",
                "url": "https://x",
                "cvss": { "score": 7.4, "vectorString": "CVSS:3.1/AV:N" }
            }"#,
        )
        .unwrap();
        assert_eq!(advisory.cvss.unwrap().score, Some(7.4));
    }

    #[test]
    fn display_includes_id_and_severity() {
        let advisory = parse(
            r#"{
                "id": 1065,
                "title": "Prototype Pollution",
                "severity": "high",
                "vulnerable_versions": "<4.17.21",
                "url": "https://x",
                "module_name": "lodash"
            }"#,
        )
        .unwrap();
        let display = advisory.to_string();
        assert!(display.contains("1065"));
        assert!(display.contains("high"));
        assert!(display.contains("lodash"));
    }
}
