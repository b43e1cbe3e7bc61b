// Database queries: CRUD operations for all tables.
//
// Every database interaction goes through this module, so SQL stays in one
// place and the rest of the app gets plain Rust interfaces.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::models::{NewRun, RunRecord};
use crate::keywords::learned::LearnedKeyword;
use crate::keywords::models::Category;

// --- Learned keywords ---

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid learned keyword timestamp {raw:?}"))?;
    Ok(parsed.with_timezone(&Utc))
}

/// Load the persisted learned keywords, most frequent first.
pub fn load_learned_keywords(conn: &Connection) -> Result<Vec<LearnedKeyword>> {
    top_learned_keywords(conn, u32::MAX)
}

/// The `limit` most frequent learned keywords.
pub fn top_learned_keywords(conn: &Connection, limit: u32) -> Result<Vec<LearnedKeyword>> {
    let mut stmt = conn.prepare(
        "SELECT term, categories, frequency, last_seen FROM learned_keywords
         ORDER BY frequency DESC, term ASC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![i64::from(limit)], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, u32>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (term, categories, frequency, last_seen) = row?;
        let categories: BTreeSet<Category> = serde_json::from_str(&categories)
            .with_context(|| format!("Invalid categories for learned keyword {term:?}"))?;
        entries.push(LearnedKeyword {
            term,
            categories,
            frequency,
            last_seen: parse_timestamp(&last_seen)?,
        });
    }
    Ok(entries)
}

/// Replace the persisted learned keywords with `entries` in one transaction.
pub fn save_learned_keywords(conn: &mut Connection, entries: &[LearnedKeyword]) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM learned_keywords", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO learned_keywords (term, categories, frequency, last_seen)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(term) DO UPDATE SET categories = ?2, frequency = ?3, last_seen = ?4",
        )?;
        for entry in entries {
            let categories = serde_json::to_string(&entry.categories)?;
            stmt.execute(params![
                entry.term,
                categories,
                entry.frequency,
                entry.last_seen.to_rfc3339()
            ])?;
        }
    }
    tx.commit().context("Failed to save learned keywords")?;
    Ok(())
}

/// Number of persisted learned keywords.
pub fn learned_keyword_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM learned_keywords", [], |row| row.get(0))?;
    Ok(count)
}

// --- Tailoring runs ---

/// Record a tailoring run and return its ID.
pub fn insert_run(conn: &Connection, run: &NewRun) -> Result<i64> {
    let missing = serde_json::to_string(&run.missing_terms)?;
    conn.execute(
        "INSERT INTO tailoring_runs
            (source_key, match_score, keyword_count, injected_count, missing_terms, recovery_ran, from_cache)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            run.source_key,
            run.match_score,
            run.keyword_count,
            run.injected_count,
            missing,
            run.recovery_ran,
            run.from_cache,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Most recent runs first.
pub fn recent_runs(conn: &Connection, limit: u32) -> Result<Vec<RunRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, source_key, match_score, keyword_count, injected_count, missing_terms,
                recovery_ran, from_cache, created_at
         FROM tailoring_runs
         ORDER BY id DESC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![i64::from(limit)], |row| {
        let missing_json: String = row.get(5)?;
        Ok(RunRecord {
            id: row.get(0)?,
            source_key: row.get(1)?,
            match_score: row.get(2)?,
            keyword_count: row.get(3)?,
            injected_count: row.get(4)?,
            missing_terms: serde_json::from_str(&missing_json).unwrap_or_default(),
            recovery_ran: row.get(6)?,
            from_cache: row.get(7)?,
            created_at: row.get(8)?,
        })
    })?;

    let mut runs = Vec::new();
    for row in rows {
        runs.push(row?);
    }
    Ok(runs)
}

/// Total recorded runs.
pub fn run_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM tailoring_runs", [], |row| row.get(0))?;
    Ok(count)
}
