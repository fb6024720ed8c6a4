//! In-memory document store
//!
//! Keeps sessions and pairs in process memory. Used for `backend: memory`
//! and as the default fake store in tests.

use super::{new_session_id, DocumentStore, MessagePair, Session, SessionUpdate};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    /// Keyed by (owner_id, session_id)
    sessions: HashMap<(String, String), Session>,
    /// Keyed by (owner_id, session_id), kept in insertion order
    pairs: HashMap<(String, String), Vec<MessagePair>>,
    next_seq: u64,
}

/// Document store backed by process memory
#[derive(Default)]
pub struct InMemoryStorage {
    inner: RwLock<Inner>,
}

impl InMemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

fn key(owner_id: &str, session_id: &str) -> (String, String) {
    (owner_id.to_string(), session_id.to_string())
}

#[async_trait]
impl DocumentStore for InMemoryStorage {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create_session(
        &self,
        owner_id: &str,
        title: &str,
        now: DateTime<Utc>,
    ) -> Result<Session> {
        let session = Session {
            id: new_session_id(),
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            message_count: 0,
            created_at: now,
            updated_at: now,
        };
        let mut inner = self.inner.write().await;
        inner
            .sessions
            .insert(key(owner_id, &session.id), session.clone());
        Ok(session)
    }

    async fn get_session(&self, owner_id: &str, session_id: &str) -> Result<Option<Session>> {
        let inner = self.inner.read().await;
        Ok(inner.sessions.get(&key(owner_id, session_id)).cloned())
    }

    async fn update_session(
        &self,
        owner_id: &str,
        session_id: &str,
        update: &SessionUpdate,
    ) -> Result<Option<Session>> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .sessions
            .get_mut(&key(owner_id, session_id))
            .map(|session| {
                update.apply_to(session);
                session.clone()
            }))
    }

    async fn delete_session(&self, owner_id: &str, session_id: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.sessions.remove(&key(owner_id, session_id)).is_some())
    }

    async fn query_sessions(&self, owner_id: &str) -> Result<Vec<Session>> {
        let inner = self.inner.read().await;
        let mut sessions: Vec<Session> = inner
            .sessions
            .values()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(sessions)
    }

    async fn create_pair(
        &self,
        owner_id: &str,
        session_id: &str,
        user_text: &str,
        assistant_text: &str,
        now: DateTime<Utc>,
    ) -> Result<MessagePair> {
        let mut inner = self.inner.write().await;
        inner.next_seq += 1;
        let pair = MessagePair {
            session_id: session_id.to_string(),
            user_text: user_text.to_string(),
            assistant_text: assistant_text.to_string(),
            timestamp: now,
            seq: inner.next_seq,
        };
        inner
            .pairs
            .entry(key(owner_id, session_id))
            .or_default()
            .push(pair.clone());
        Ok(pair)
    }

    async fn query_pairs(&self, owner_id: &str, session_id: &str) -> Result<Vec<MessagePair>> {
        let inner = self.inner.read().await;
        let mut pairs = inner
            .pairs
            .get(&key(owner_id, session_id))
            .cloned()
            .unwrap_or_default();
        pairs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.seq.cmp(&b.seq)));
        Ok(pairs)
    }

    async fn delete_pairs(&self, owner_id: &str, session_id: &str) -> Result<usize> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .pairs
            .remove(&key(owner_id, session_id))
            .map(|p| p.len())
            .unwrap_or(0))
    }
}
