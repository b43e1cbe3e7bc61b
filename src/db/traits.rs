// Database trait: async interface for persistence.
//
// The methods are async so a synchronous backend (rusqlite behind a Mutex)
// and a natively async one fit behind the same `Arc<dyn Database>`.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{NewRun, RunRecord};
use crate::keywords::learned::LearnedKeyword;

#[async_trait]
pub trait Database: Send + Sync {
    // --- Lifecycle ---

    /// Count the user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Learned keywords ---

    /// Every persisted learned keyword, most frequent first.
    async fn load_learned_keywords(&self) -> Result<Vec<LearnedKeyword>>;

    /// Replace the persisted set atomically.
    async fn save_learned_keywords(&self, entries: &[LearnedKeyword]) -> Result<()>;

    async fn top_learned_keywords(&self, limit: u32) -> Result<Vec<LearnedKeyword>>;

    async fn learned_keyword_count(&self) -> Result<i64>;

    // --- Run history ---

    /// Record a tailoring run and return its ID.
    async fn record_run(&self, run: &NewRun) -> Result<i64>;

    /// Most recent runs first.
    async fn recent_runs(&self, limit: u32) -> Result<Vec<RunRecord>>;

    async fn run_count(&self) -> Result<i64>;
}
