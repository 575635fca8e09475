//! 질의 페이로드 -- 중복 제거, 그룹화, gzip 인코딩
//!
//! 벌크 질의 본문은 패키지 이름을 키로, 요청 버전 문자열 배열을 값으로
//! 하는 JSON 객체입니다. 요청마다 새로 만들어지고 전송 후 버려집니다.

use std::collections::{BTreeMap, HashSet};
use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

use lockgate_core::types::PackageRef;

use crate::error::AdvisoryScannerError;

/// `name@version` 키 기준으로 중복을 제거합니다.
///
/// 첫 등장 순서를 유지합니다. 같은 이름이 서로 다른 버전으로 여러 번
/// 나타나면 각 버전이 하나씩 남습니다.
pub fn dedup_packages(packages: &[PackageRef]) -> Vec<&PackageRef> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for package in packages {
        if seen.insert(package.ident()) {
            unique.push(package);
        }
    }
    unique
}

/// 패키지 이름 -> 고유 버전 목록 매핑을 생성합니다.
///
/// 같은 이름이 동일 버전으로 여러 번 들어와도 버전 항목은 하나만 남습니다.
pub fn group_by_name(packages: &[&PackageRef]) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for package in packages {
        let versions = grouped.entry(package.name.clone()).or_default();
        if !versions.contains(&package.version) {
            versions.push(package.version.clone());
        }
    }
    grouped
}

/// 그룹화된 페이로드를 JSON으로 직렬화한 뒤 gzip으로 압축합니다.
pub fn encode_payload(
    grouped: &BTreeMap<String, Vec<String>>,
) -> Result<Vec<u8>, AdvisoryScannerError> {
    let json = serde_json::to_vec(grouped)
        .map_err(|e| AdvisoryScannerError::Serialization(e.to_string()))?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| AdvisoryScannerError::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| AdvisoryScannerError::Compression(e.to_string()))
}
