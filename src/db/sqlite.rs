// SqliteDatabase: rusqlite backend implementing the Database trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is not
// Sync. Trait methods lock the mutex, do synchronous rusqlite work, and
// return; the lock is never held across an .await point.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{NewRun, RunRecord};
use super::traits::Database;
use crate::keywords::learned::LearnedKeyword;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn load_learned_keywords(&self) -> Result<Vec<LearnedKeyword>> {
        let conn = self.conn.lock().await;
        super::queries::load_learned_keywords(&conn)
    }

    async fn save_learned_keywords(&self, entries: &[LearnedKeyword]) -> Result<()> {
        let mut conn = self.conn.lock().await;
        super::queries::save_learned_keywords(&mut conn, entries)
    }

    async fn top_learned_keywords(&self, limit: u32) -> Result<Vec<LearnedKeyword>> {
        let conn = self.conn.lock().await;
        super::queries::top_learned_keywords(&conn, limit)
    }

    async fn learned_keyword_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::learned_keyword_count(&conn)
    }

    async fn record_run(&self, run: &NewRun) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::insert_run(&conn, run)
    }

    async fn recent_runs(&self, limit: u32) -> Result<Vec<RunRecord>> {
        let conn = self.conn.lock().await;
        super::queries::recent_runs(&conn, limit)
    }

    async fn run_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::run_count(&conn)
    }
}
