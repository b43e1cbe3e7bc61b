// Data models: Rust structs that map to database rows.
//
// Kept apart from the queries so other modules can use them without
// depending on rusqlite directly. Learned keywords reuse
// `keywords::learned::LearnedKeyword`.

use serde::{Deserialize, Serialize};

use crate::tailor::pipeline::TailoredResult;

/// A run about to be recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRun {
    /// Cache key of the JD (`url:…` or a content fingerprint)
    pub source_key: String,
    pub match_score: f64,
    pub keyword_count: u32,
    pub injected_count: u32,
    pub missing_terms: Vec<String>,
    pub recovery_ran: bool,
    pub from_cache: bool,
}

impl NewRun {
    pub fn from_result(source_key: impl Into<String>, result: &TailoredResult) -> Self {
        Self {
            source_key: source_key.into(),
            match_score: result.match_score,
            keyword_count: result.keywords.len() as u32,
            injected_count: result.log.len() as u32,
            missing_terms: result.report.missing_terms.clone(),
            recovery_ran: result.recovery_ran,
            from_cache: result.from_cache,
        }
    }
}

/// A recorded tailoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: i64,
    pub source_key: String,
    pub match_score: f64,
    pub keyword_count: u32,
    pub injected_count: u32,
    /// JSON-encoded in the DB
    pub missing_terms: Vec<String>,
    pub recovery_ran: bool,
    pub from_cache: bool,
    pub created_at: String,
}
