// Section allocator: decides which résumé section serves which keyword.
//
// Pure bookkeeping: pools are lists of indices into the keyword slice, and
// the keywords themselves are never touched.
//   - summary: the first few high-tier terms
//   - skills: non-soft terms, deduplicated case-insensitively, capped
//   - experience: every high and medium term, plus low-tier terms the skills
//     section cannot take (soft skills, overflow past the cap)
// Pools overlap on purpose. Mention targets are whole-document counts, so a
// high-tier term may be served by the summary, several bullets, and skills.

use std::collections::HashSet;

use serde::Serialize;

use crate::config::TailorConfig;
use crate::keywords::models::{Keyword, Tier};
use crate::text::normalize_term;

/// Allowed keyword counts per section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeywordBudget {
    pub summary: usize,
    pub experience: usize,
    pub skills: usize,
}

/// Per-section keyword pools, as indices into the keyword list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionPlan {
    pub summary: Vec<usize>,
    pub experience: Vec<usize>,
    pub skills: Vec<usize>,
    pub budget: KeywordBudget,
}

impl SectionPlan {
    /// Resolve a pool to its keywords.
    pub fn resolve<'a>(pool: &[usize], keywords: &'a [Keyword]) -> Vec<&'a Keyword> {
        pool.iter().filter_map(|&i| keywords.get(i)).collect()
    }
}

/// Split a tiered keyword list into section pools.
pub fn allocate(keywords: &[Keyword], config: &TailorConfig) -> SectionPlan {
    let summary: Vec<usize> = keywords
        .iter()
        .enumerate()
        .filter(|(_, k)| k.tier == Tier::High && !k.is_soft_skill())
        .map(|(i, _)| i)
        .take(config.summary_slice)
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let skills: Vec<usize> = keywords
        .iter()
        .enumerate()
        .filter(|(_, k)| !k.is_soft_skill())
        .filter(|(_, k)| seen.insert(normalize_term(&k.term)))
        .map(|(i, _)| i)
        .take(config.skills_cap)
        .collect();

    let skill_set: HashSet<usize> = skills.iter().copied().collect();
    let experience: Vec<usize> = keywords
        .iter()
        .enumerate()
        .filter(|(i, k)| k.tier != Tier::Low || !skill_set.contains(i))
        .map(|(i, _)| i)
        .collect();

    let budget = KeywordBudget {
        summary: config.summary_clause_max.min(8),
        experience: experience.len(),
        skills: config.skills_cap,
    };

    SectionPlan {
        summary,
        experience,
        skills,
        budget,
    }
}
