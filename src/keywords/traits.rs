// Keyword extractor trait: swap-ready abstraction.
//
// The pipeline only ever talks to this trait. The default implementation is
// frequency-based scoring over the classification ruleset; the cache wraps
// any implementation as a decorator, so a different scorer picks up caching
// for free.

use anyhow::Result;

use super::models::Extraction;
use crate::jd::models::JobDescription;

/// Trait for turning a job description into ranked, tiered keywords.
pub trait KeywordExtractor: Send + Sync {
    /// Analyze a job description and produce its keyword set.
    fn extract(&self, jd: &JobDescription) -> Result<Extraction>;
}
