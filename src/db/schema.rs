// Database schema: table creation and migrations.
//
// A `schema_version` table tracks which migrations have run, and each
// migration is a function that executes SQL statements.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// Idempotent, safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Terms seen across job descriptions, used for the learned boost
        CREATE TABLE IF NOT EXISTS learned_keywords (
            term TEXT PRIMARY KEY,             -- normalized (lowercase)
            frequency INTEGER NOT NULL,
            last_seen TEXT NOT NULL            -- RFC 3339
        );

        -- One row per tailoring request
        CREATE TABLE IF NOT EXISTS tailoring_runs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source_key TEXT NOT NULL,          -- url:... or sha256:...
            match_score REAL NOT NULL,         -- 0.0 to 100.0
            keyword_count INTEGER NOT NULL,
            injected_count INTEGER NOT NULL,
            missing_terms TEXT NOT NULL,       -- JSON array
            recovery_ran INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_runs_created
            ON tailoring_runs(created_at);
        ",
    )
    .context("Failed to create database tables")?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    // Migration v2: record whether the keywords came from the cache.
    run_migration(conn, 2, |c| {
        c.execute_batch(
            "ALTER TABLE tailoring_runs ADD COLUMN from_cache INTEGER NOT NULL DEFAULT 0;",
        )
    })?;

    // Migration v3: the learned-store snapshot evicts by last_seen.
    run_migration(conn, 3, |c| {
        c.execute_batch(
            "CREATE INDEX IF NOT EXISTS idx_learned_last_seen ON learned_keywords(last_seen);",
        )
    })?;

    // Migration v4: categories the term was classified under (JSON array).
    run_migration(conn, 4, |c| {
        c.execute_batch(
            "ALTER TABLE learned_keywords ADD COLUMN categories TEXT NOT NULL DEFAULT '[]';",
        )
    })?;

    Ok(())
}

/// Run a migration if it hasn't been applied yet.
fn run_migration<F>(conn: &Connection, version: i64, migrate: F) -> Result<()>
where
    F: FnOnce(&Connection) -> rusqlite::Result<()>,
{
    let already_applied: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM schema_version WHERE version = ?1",
        [version],
        |row| row.get(0),
    )?;

    if !already_applied {
        migrate(conn).with_context(|| format!("Migration v{version} failed"))?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )?;
    }

    Ok(())
}

/// Count the user tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
    }

    #[test]
    fn test_table_count() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        // schema_version, learned_keywords, tailoring_runs
        assert_eq!(table_count(&conn).unwrap(), 3);
    }

    #[test]
    fn test_migration_v2_adds_from_cache_column() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        conn.execute(
            "INSERT INTO tailoring_runs
                (source_key, match_score, keyword_count, injected_count, missing_terms, from_cache)
             VALUES ('url:x', 90.0, 10, 4, '[]', 1)",
            [],
        )
        .unwrap();
        let from_cache: bool = conn
            .query_row("SELECT from_cache FROM tailoring_runs", [], |row| row.get(0))
            .unwrap();
        assert!(from_cache);
    }

    #[test]
    fn test_migration_v4_defaults_categories_to_empty() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        conn.execute(
            "INSERT INTO learned_keywords (term, frequency, last_seen)
             VALUES ('kafka', 2, '2026-03-01T12:00:00+00:00')",
            [],
        )
        .unwrap();
        let categories: String = conn
            .query_row("SELECT categories FROM learned_keywords", [], |row| row.get(0))
            .unwrap();
        assert_eq!(categories, "[]");
    }

    #[test]
    fn test_migrations_run_once() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();

        let versions: Vec<i64> = conn
            .prepare("SELECT version FROM schema_version ORDER BY version")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(versions, vec![1, 2, 3, 4]);
    }
}
