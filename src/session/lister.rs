//! Recency-ordered session history

use super::ChatHistory;
use crate::error::Result;
use crate::storage::Session;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Read-only row of the history view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub message_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionSummary {
    /// First eight characters of the id
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((cut, _)) => &self.id[..cut],
            None => &self.id,
        }
    }

    /// `true` for sessions created but not yet used
    pub fn is_unused(&self) -> bool {
        self.message_count == 0
    }

    /// Title shortened to `max_chars` for narrow columns
    pub fn display_title(&self, max_chars: usize) -> String {
        if self.title.chars().count() <= max_chars {
            return self.title.clone();
        }
        let keep = max_chars.saturating_sub(3);
        let head: String = self.title.chars().take(keep).collect();
        format!("{}...", head)
    }
}

impl From<Session> for SessionSummary {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            title: session.title,
            message_count: session.message_count,
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

impl ChatHistory {
    /// All sessions of an owner, most recently active first
    ///
    /// An owner without sessions gets an empty list.
    pub async fn list_sessions(&self, owner_id: &str) -> Result<Vec<Session>> {
        let sessions = self.store.query_sessions(owner_id).await?;
        tracing::debug!(owner_id, count = sessions.len(), "Listed sessions");
        Ok(sessions)
    }

    /// History view for an owner, in the same order as `list_sessions`
    pub async fn history(&self, owner_id: &str) -> Result<Vec<SessionSummary>> {
        Ok(self
            .list_sessions(owner_id)
            .await?
            .into_iter()
            .map(SessionSummary::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;
    use std::sync::Arc;
    use std::time::Duration;

    fn history() -> ChatHistory {
        ChatHistory::new(Arc::new(InMemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_list_sessions_empty_for_new_owner() {
        let history = history();
        assert!(history.list_sessions("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_moves_older_session_to_front() {
        let history = history();
        let older = history.create_session("alice", None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        let newer = history.create_session("alice", None).await.unwrap();

        let ids: Vec<String> = history
            .list_sessions("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![newer.id.clone(), older.id.clone()]);

        tokio::time::sleep(Duration::from_millis(2)).await;
        history
            .append_pair("alice", &older.id, "Neem for skin?", "Yes, topically.")
            .await
            .unwrap();

        let ids: Vec<String> = history
            .list_sessions("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![older.id, newer.id]);
    }

    #[tokio::test]
    async fn test_history_includes_unused_sessions() {
        let history = history();
        history.create_session("alice", None).await.unwrap();

        let rows = history.history("alice").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_unused());
        assert_eq!(rows[0].short_id().len(), 8);
    }

    #[test]
    fn test_display_title_shortens_long_titles() {
        let now = Utc::now();
        let summary = SessionSummary {
            id: "abc".to_string(),
            title: "x".repeat(45),
            message_count: 1,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(summary.display_title(40), format!("{}...", "x".repeat(37)));
        assert_eq!(summary.display_title(50), "x".repeat(45));
        assert_eq!(summary.short_id(), "abc");
    }
}
