//! 시맨틱 버전 비교 -- 취약 범위 매칭
//!
//! `semver` 크레이트를 사용하여 확정 버전이 어드바이저리의 취약 범위에
//! 포함되는지 확인합니다. 범위 파싱 실패는 이 모듈 안에서 소비되며
//! 밖으로는 항상 bool만 나갑니다. 파싱 실패를 매칭으로 오인하면
//! 안전한 설치를 잘못 차단하게 되므로, 실패는 "영향 없음"으로 처리합니다.
//!
//! # 범위 문법
//!
//! - 절 내부: 공백으로 구분된 비교자들의 AND (예: `>=1.0.0 <2.0.0`)
//! - 절 사이: `||`로 구분된 OR
//! - `*` 또는 빈 절: 모든 유효 버전과 매칭
//! - 프리릴리스 버전은 같은 major.minor.patch에 프리릴리스를 명시한
//!   비교자만 만족합니다 (semver 크레이트의 기본 규칙)

use semver::{Version, VersionReq};
use tracing::warn;

/// 주어진 확정 버전이 취약 범위에 포함되는지 확인합니다.
///
/// 버전 또는 범위가 파싱되지 않으면 경고를 남기고 `false`를 반환합니다.
/// 이 함수는 어떤 입력에 대해서도 패닉하거나 에러를 반환하지 않습니다.
pub fn is_affected(version: &str, range: &str) -> bool {
    let version = match Version::parse(version.trim()) {
        Ok(v) => v,
        Err(e) => {
            warn!(version, error = %e, "failed to parse package version, treating as not affected");
            return false;
        }
    };

    match parse_range(range) {
        Ok(clauses) => clauses.iter().any(|clause| clause.matches(&version)),
        Err(e) => {
            warn!(range, error = %e, "failed to parse vulnerable range, treating as not affected");
            false
        }
    }
}

/// `||`로 구분된 범위 절 하나
#[derive(Debug, Clone)]
enum RangeClause {
    /// `*` 또는 빈 절 — 모든 유효 버전과 매칭
    Any,
    /// 비교자 집합 (AND)
    Req(VersionReq),
}

impl RangeClause {
    fn matches(&self, version: &Version) -> bool {
        match self {
            Self::Any => true,
            Self::Req(req) => req.matches(version),
        }
    }
}

/// 범위 표현식 전체를 절 목록으로 파싱합니다.
///
/// 어느 한 절이라도 파싱에 실패하면 전체가 실패합니다.
fn parse_range(range: &str) -> Result<Vec<RangeClause>, semver::Error> {
    range.split("||").map(parse_clause).collect()
}

fn parse_clause(clause: &str) -> Result<RangeClause, semver::Error> {
    let trimmed = clause.trim();
    if trimmed.is_empty() || trimmed == "*" {
        return Ok(RangeClause::Any);
    }
    VersionReq::parse(&normalize_comparators(trimmed)).map(RangeClause::Req)
}

/// 공백 구분 비교자 집합을 `semver` 크레이트의 쉼표 구분 형식으로 변환합니다.
///
/// `>= 1.0.0`처럼 연산자와 버전 사이에 공백이 있는 표기도 허용합니다.
fn normalize_comparators(clause: &str) -> String {
    let mut comparators: Vec<String> = Vec::new();
    let mut pending_op: Option<&str> = None;

    for token in clause.split_whitespace() {
        if matches!(token, "<" | "<=" | ">" | ">=" | "=" | "^" | "~") {
            pending_op = Some(token);
            continue;
        }
        match pending_op.take() {
            Some(op) => comparators.push(format!("{op}{token}")),
            None => comparators.push(token.to_owned()),
        }
    }

    // 짝을 못 찾은 연산자는 그대로 남겨 파싱 에러가 나게 합니다
    if let Some(op) = pending_op {
        comparators.push(op.to_owned());
    }

    comparators.join(", ")
}
