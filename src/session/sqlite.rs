use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rusqlite::{Connection, params};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

use super::{SessionContext, SessionStore};
use crate::consts::SESSION_TTL_HOURS;

/// SQLite-backed session store. One row per session, JSON payload.
///
/// Rows idle for longer than the TTL are invisible to [`load`](SessionStore::load)
/// and deleted on every [`save`](SessionStore::save).
pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
    ttl: Duration,
}

impl SqliteSessionStore {
    /// Open or create the sessions table in the given database path.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open session database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id         TEXT PRIMARY KEY,
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                data       TEXT NOT NULL
            )",
        )
        .context("failed to create sessions table")?;
        Ok(Self {
            conn: Mutex::new(conn),
            ttl: Duration::from_secs(SESSION_TTL_HOURS * 3600),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("session database lock poisoned"))
    }

    /// SQLite `datetime` modifier for the oldest `updated_at` still alive.
    fn cutoff(&self) -> String {
        format!("-{} seconds", self.ttl.as_secs())
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn load(&self, id: &str) -> Result<Option<SessionContext>> {
        let cutoff = self.cutoff();
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT data FROM sessions WHERE id = ?1 AND updated_at >= datetime('now', ?2)",
        )?;
        let mut rows = stmt.query(params![id, cutoff])?;
        match rows.next()? {
            Some(row) => {
                let json: String = row.get(0)?;
                let session = serde_json::from_str(&json)
                    .with_context(|| format!("corrupt session {id}"))?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, id: &str, session: &SessionContext) -> Result<()> {
        let json = serde_json::to_string(session)?;
        let cutoff = self.cutoff();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sessions (id, data) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data, updated_at = datetime('now')",
            params![id, json],
        )?;
        let swept = conn.execute(
            "DELETE FROM sessions WHERE updated_at < datetime('now', ?1)",
            params![cutoff],
        )?;
        if swept > 0 {
            debug!(swept, "expired sessions removed");
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM sessions WHERE id = ?1", [id])?;
        Ok(())
    }
}
