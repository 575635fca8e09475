//! 응답 검증 -- 두 가지 응답 형태의 명시적 디코드
//!
//! 레지스트리 응답은 두 형태 중 하나입니다:
//!
//! 1. **직접 매핑**: 본문 자체가 어드바이저리 ID -> 레코드 매핑
//! 2. **감싼 매핑**: `advisories` 필드가 1번 형태를 담은 객체
//!    (그 외 메타데이터 필드는 무시)
//!
//! 형태를 순서대로 시도하고, 둘 다 실패하면 두 실패 사유를 모두 담은
//! [`AdvisoryScannerError::Schema`]를 반환합니다. 어떤 형태가 왜
//! 거부되었는지 숨기지 않습니다. 스키마 에러는 이 계층에서 삼키지 않으며
//! 억제 여부는 호출자가 결정합니다.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::AdvisoryScannerError;
use crate::types::RawAdvisory;

/// `advisories` 필드로 감싼 응답 형태
#[derive(Deserialize)]
struct WrappedAdvisories {
    advisories: BTreeMap<String, RawAdvisory>,
}

/// 원시 응답 본문을 어드바이저리 매핑으로 검증/정규화합니다.
///
/// # Errors
///
/// 본문이 JSON이 아니거나 두 형태 모두에 맞지 않으면
/// `AdvisoryScannerError::Schema`를 반환합니다.
pub fn validate(body: &[u8]) -> Result<BTreeMap<String, RawAdvisory>, AdvisoryScannerError> {
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
        let reason = format!("body is not valid JSON: {e}");
        AdvisoryScannerError::Schema {
            direct: reason.clone(),
            wrapped: reason,
        }
    })?;

    // 형태 1: ID -> 레코드 직접 매핑
    let direct_reason = match serde_json::from_value::<BTreeMap<String, RawAdvisory>>(value.clone())
    {
        Ok(map) => return Ok(map),
        Err(e) => e.to_string(),
    };

    // 형태 2: advisories 필드로 감싼 매핑
    match serde_json::from_value::<WrappedAdvisories>(value) {
        Ok(wrapped) => Ok(wrapped.advisories),
        Err(e) => Err(AdvisoryScannerError::Schema {
            direct: direct_reason,
            wrapped: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockgate_core::types::AdvisorySeverity;

    const ADVISORY: &str = r#"{
        "id": 1065,
        "title": "Prototype Pollution",
        "module_name": "lodash",
        "severity": "high",
        "vulnerable_versions": "<4.17.21",
        "url": "https://npmjs.com/advisories/1065"
    }"#;

    #[test]
    fn accepts_direct_map_shape() {
        let body = format!(r#"{{"1065": {ADVISORY}}}"#);
        let map = validate(body.as_bytes()).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["1065"].id, "1065");
        assert_eq!(map["1065"].severity, AdvisorySeverity::High);
    }

    #[test]
    fn accepts_wrapped_shape_with_metadata() {
        let body = format!(r#"{{"advisories": {{"1065": {ADVISORY}}}, "total": 1}}"#);
        let map = validate(body.as_bytes()).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["1065"].subject_name(), Some("lodash"));
    }

    #[test]
    fn accepts_empty_direct_map() {
        let map = validate(b"{}").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn accepts_empty_wrapped_map() {
        let map = validate(br#"{"advisories": {}}"#).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn rejects_unrecognized_shape_with_both_reasons() {
        let result = validate(br#"{"items": [1, 2, 3]}"#);
        let err = result.unwrap_err();
        match err {
            AdvisoryScannerError::Schema { direct, wrapped } => {
                assert!(!direct.is_empty());
                assert!(!wrapped.is_empty());
            }
            other => panic!("expected schema error, got {other}"),
        }
    }

    #[test]
    fn rejects_non_json_body() {
        let result = validate(b"<html>502 Bad Gateway</html>");
        assert!(matches!(result, Err(AdvisoryScannerError::Schema { .. })));
    }

    #[test]
    fn rejects_advisory_missing_required_fields() {
        // severity가 닫힌 집합 밖이면 두 형태 모두 실패
        let body = br#"{"1": {"id": 1, "title": "t", "severity": "extreme",
            "vulnerable_versions": "*", "url": "https://x"}}"#;
        assert!(matches!(
            validate(body),
            Err(AdvisoryScannerError::Schema { .. })
        ));
    }

    #[test]
    fn rejects_array_body() {
        assert!(matches!(
            validate(b"[1, 2, 3]"),
            Err(AdvisoryScannerError::Schema { .. })
        ));
    }
}
