use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::{SessionContext, SessionStore};
use crate::consts::SESSION_TTL_HOURS;

/// Process-local session store. Sessions vanish on restart, and entries
/// idle for longer than the TTL are dropped on the next save.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, (Instant, SessionContext)>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::default(),
            ttl: Duration::from_secs(SESSION_TTL_HOURS * 3600),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &str) -> Result<Option<SessionContext>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(id)
            .filter(|(touched, _)| touched.elapsed() <= self.ttl)
            .map(|(_, session)| session.clone()))
    }

    async fn save(&self, id: &str, session: &SessionContext) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, (touched, _)| touched.elapsed() < self.ttl);
        sessions.insert(id.to_string(), (Instant::now(), session.clone()));
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.sessions.write().await.remove(id);
        Ok(())
    }
}
