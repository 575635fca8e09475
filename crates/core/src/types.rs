//! 도메인 타입 — 어드바이저리 스캔 전역에서 사용되는 공통 타입
//!
//! 호스트(패키지 매니저)와 주고받는 데이터 구조를 정의합니다.
//! 스캐너 내부 전용 타입은 `lockgate-advisory-scanner` 크레이트에 있습니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 어드바이저리 심각도 레이블
///
/// 레지스트리가 사용하는 닫힌 5단계 집합입니다.
/// `Ord` 구현으로 심각도 비교가 가능합니다 (`Info < Low < Moderate < High < Critical`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AdvisorySeverity {
    /// 정보성
    #[default]
    Info,
    /// 낮은 심각도
    Low,
    /// 중간 심각도
    Moderate,
    /// 높은 심각도
    High,
    /// 치명적 — 설치 차단 대상
    Critical,
}

impl AdvisorySeverity {
    /// 문자열에서 심각도를 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "info" | "informational" => Some(Self::Info),
            "low" => Some(Self::Low),
            "moderate" | "medium" => Some(Self::Moderate),
            "high" => Some(Self::High),
            "critical" | "crit" => Some(Self::Critical),
            _ => None,
        }
    }

    /// 정렬용 우선순위를 반환합니다 (Critical=5 > ... > Info=1).
    pub fn priority(self) -> u8 {
        match self {
            Self::Critical => 5,
            Self::High => 4,
            Self::Moderate => 3,
            Self::Low => 2,
            Self::Info => 1,
        }
    }
}

impl fmt::Display for AdvisorySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Low => write!(f, "low"),
            Self::Moderate => write!(f, "moderate"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// 어드바이저리 조치 등급
///
/// 호스트가 설치를 차단할지(`Fatal`) 경고만 할지(`Warn`) 결정하는
/// 2단계 등급입니다. `Warn < Fatal` 순서로 비교할 수 있습니다.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryLevel {
    /// 경고 — 설치는 계속 가능
    Warn,
    /// 치명 — 설치 차단 권고
    Fatal,
}

impl AdvisoryLevel {
    /// 설치 차단 등급인지 반환합니다.
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::Fatal)
    }
}

impl fmt::Display for AdvisoryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warn => write!(f, "warn"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// 설치 대상 패키지 참조
///
/// 호스트가 스캔 요청 시 전달하는 단일 패키지입니다.
/// `version`은 항상 확정된 시맨틱 버전이며 범위가 아닙니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageRef {
    /// 패키지 이름 (스코프 포함 가능, 예: `@scope/name`)
    pub name: String,
    /// 설치될 확정 버전
    pub version: String,
    /// 호스트가 해석한 요청 범위 (있을 경우)
    ///
    /// Note: 중복 제거 키에는 포함되지 않습니다. 스캐너는 실제 설치되는
    /// 버전만 검사 대상으로 삼습니다.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_range: Option<String>,
    /// tarball 위치 (있을 경우)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tarball: Option<String>,
}

impl PackageRef {
    /// 이름과 버전만으로 참조를 생성합니다.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            requested_range: None,
            tarball: None,
        }
    }

    /// 중복 제거에 사용하는 식별 키 (`name@version`)를 반환합니다.
    pub fn ident(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// 매칭된 어드바이저리 레코드
///
/// 호스트에 반환되는 최종 결과 단위입니다.
/// (어드바이저리 ID, 패키지 이름, 패키지 버전) 조합당 최대 한 번 생성됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedAdvisory {
    /// 어드바이저리 ID (수신 시 문자열로 정규화됨)
    pub id: String,
    /// 호스트에 표시할 메시지
    pub message: String,
    /// 조치 등급
    pub level: AdvisoryLevel,
    /// 영향받는 패키지 (`name@version`)
    pub package: String,
    /// 어드바이저리 상세 URL
    pub url: String,
    /// 상세 설명 (없을 수 있음)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl fmt::Display for MatchedAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.level, self.package, self.id, self.message,
        )
    }
}
