//! 어드바이저리 프로세서 -- 패키지 fan-out 및 최종 레코드 생성
//!
//! [`AdvisoryProcessor`]는 질의로 받은 원시 어드바이저리를 입력 패키지
//! 목록에 대조하여 [`MatchedAdvisory`] 레코드를 생성합니다.
//!
//! # 처리 규칙
//!
//! - 어드바이저리 순서가 바깥 루프, 패키지 순서가 안쪽 루프입니다.
//!   첫 어드바이저리의 모든 매칭이 두 번째 어드바이저리의 매칭보다
//!   먼저 나옵니다.
//! - `id:name@version` 키로 중복을 억제합니다. 같은 패키지 버전이
//!   입력에 여러 번 나타나도 (예: 여러 경로에 호이스팅) 레코드는
//!   한 번만 생성됩니다.
//! - 대상 이름은 `name` 필드 우선, 구식 `module_name` 폴백. 둘 다 없으면
//!   해당 어드바이저리는 통째로 건너뜁니다.
//! - 범위 파싱 실패는 버전 매처 안에서 흡수되어 다음 패키지/어드바이저리
//!   처리를 중단시키지 않습니다.

use std::collections::HashSet;

use tracing::debug;

use lockgate_core::types::{MatchedAdvisory, PackageRef};

use crate::matching::{level_for, version};
use crate::types::RawAdvisory;

/// 어드바이저리 프로세서
#[derive(Debug, Clone)]
pub struct AdvisoryProcessor {
    /// 결과 레코드 설명의 최대 길이 (문자)
    max_description_len: usize,
}

impl AdvisoryProcessor {
    /// 새 프로세서를 생성합니다.
    pub fn new(max_description_len: usize) -> Self {
        Self {
            max_description_len,
        }
    }

    /// 원시 어드바이저리를 패키지 목록에 대조하여 최종 레코드를 생성합니다.
    ///
    /// 둘 중 한 목록이라도 비어 있으면 즉시 빈 결과를 반환합니다.
    pub fn process(
        &self,
        advisories: &[RawAdvisory],
        packages: &[PackageRef],
    ) -> Vec<MatchedAdvisory> {
        if advisories.is_empty() || packages.is_empty() {
            return Vec::new();
        }

        let mut processed: HashSet<String> = HashSet::new();
        let mut records = Vec::new();

        for advisory in advisories {
            let Some(subject) = advisory.subject_name() else {
                debug!(
                    advisory = %advisory.id,
                    "advisory has no subject package name, skipping"
                );
                continue;
            };

            for package in packages.iter().filter(|p| p.name == subject) {
                let key = format!("{}:{}", advisory.id, package.ident());
                if processed.contains(&key) {
                    continue;
                }

                if !version::is_affected(&package.version, &advisory.vulnerable_versions) {
                    continue;
                }

                records.push(MatchedAdvisory {
                    id: advisory.id.clone(),
                    message: advisory.title.trim().to_owned(),
                    level: level_for(advisory.severity),
                    package: package.ident(),
                    url: advisory.url.clone(),
                    description: self.derive_description(advisory),
                });
                processed.insert(key);
            }
        }

        records
    }

    /// 레코드 설명을 유도합니다.
    ///
    /// 우선순위: (1) overview — 길이 초과 시 첫 문장 경계, 그래도 넘치면
    /// 말줄임표로 절단; (2) recommendation — 문장 경계 없이 같은 절단 규칙;
    /// (3) 둘 다 없으면 `None` (정상 상태).
    fn derive_description(&self, advisory: &RawAdvisory) -> Option<String> {
        if let Some(overview) = advisory.overview.as_deref() {
            let trimmed = overview.trim();
            if !trimmed.is_empty() {
                return Some(self.truncate_at_sentence(trimmed));
            }
        }

        if let Some(recommendation) = advisory.recommendation.as_deref() {
            let trimmed = recommendation.trim();
            if !trimmed.is_empty() {
                return Some(self.truncate_plain(trimmed));
            }
        }

        None
    }

    /// 길이 예산 안이면 원문 그대로, 넘치면 첫 문장 경계에서 자르고,
    /// 문장 경계도 예산을 넘으면 말줄임표로 절단합니다.
    fn truncate_at_sentence(&self, text: &str) -> String {
        if text.chars().count() <= self.max_description_len {
            return text.to_owned();
        }

        if let Some(sentence) = first_sentence(text)
            && sentence.chars().count() <= self.max_description_len
        {
            return sentence.to_owned();
        }

        hard_truncate(text, self.max_description_len)
    }

    /// 길이 예산 안이면 원문 그대로, 넘치면 말줄임표로 절단합니다.
    fn truncate_plain(&self, text: &str) -> String {
        if text.chars().count() <= self.max_description_len {
            return text.to_owned();
        }
        hard_truncate(text, self.max_description_len)
    }
}

/// 첫 문장 종결 부호까지의 접두어를 반환합니다.
fn first_sentence(text: &str) -> Option<&str> {
    text.char_indices()
        .find(|(_, c)| matches!(c, '.' | '!' | '?'))
        .map(|(i, c)| &text[..i + c.len_utf8()])
}

/// `max - 3` 문자에서 자르고 말줄임표를 붙입니다.
fn hard_truncate(text: &str, max: usize) -> String {
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}
