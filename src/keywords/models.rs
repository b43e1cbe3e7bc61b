// Keyword data model: the values that flow from extraction to injection.
//
// Keywords are created fresh for every extraction and are only touched again
// when the extractor assigns their tier and mention target.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::jd::models::StructureKind;

/// Classification bucket for a term. A term may carry several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Language,
    Framework,
    CloudDevOps,
    Security,
    DataTool,
    Compliance,
    Crm,
    Methodology,
    HardSkill,
    SoftSkill,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Language => "language",
            Category::Framework => "framework",
            Category::CloudDevOps => "cloudDevOps",
            Category::Security => "security",
            Category::DataTool => "dataTool",
            Category::Compliance => "compliance",
            Category::Crm => "crm",
            Category::Methodology => "methodology",
            Category::HardSkill => "hardSkill",
            Category::SoftSkill => "softSkill",
        }
    }

    /// Everything except soft skills counts as technical.
    pub fn is_technical(&self) -> bool {
        !matches!(self, Category::SoftSkill)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Priority bucket controlling how often a term should be repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::High => "high",
            Tier::Medium => "medium",
            Tier::Low => "low",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inclusive range of whole-document mentions a keyword should reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionRange {
    pub min: usize,
    pub max: usize,
}

impl MentionRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

/// A scored, classified keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyword {
    /// Display form (canonical capitalization when the ruleset knows the term)
    pub term: String,
    pub categories: BTreeSet<Category>,
    pub tier: Tier,
    pub frequency_in_jd: usize,
    pub score: f64,
    pub target_mentions: MentionRange,
    /// Found by the mandatory-term dictionaries rather than frequency alone
    pub mandatory: bool,
}

impl Keyword {
    pub fn is_soft_skill(&self) -> bool {
        self.categories.contains(&Category::SoftSkill)
            && !self.categories.iter().any(|c| c.is_technical())
    }

    pub fn is_technical(&self) -> bool {
        self.categories.iter().any(|c| c.is_technical())
    }
}

/// The outcome of one extraction run (or a cache hit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    /// High tier first, priority order within each tier
    pub keywords: Vec<Keyword>,
    pub structure: StructureKind,
    /// True when the keywords came from the cache without re-scoring
    pub from_cache: bool,
}

impl Extraction {
    pub fn empty(structure: StructureKind) -> Self {
        Self {
            keywords: Vec::new(),
            structure,
            from_cache: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn by_tier(&self, tier: Tier) -> impl Iterator<Item = &Keyword> {
        self.keywords.iter().filter(move |k| k.tier == tier)
    }
}
