//! Append-only message log

use super::ChatHistory;
use crate::error::{Result, VaidyaError};
use crate::storage::{current_time, MessagePair, Session};

/// Reject pairs with an empty half before anything is written
///
/// Whitespace-only text counts as empty.
fn validate_pair(user_text: &str, assistant_text: &str) -> Result<()> {
    if user_text.trim().is_empty() {
        return Err(VaidyaError::Validation("User message cannot be empty".into()));
    }
    if assistant_text.trim().is_empty() {
        return Err(VaidyaError::Validation(
            "Assistant reply cannot be empty".into(),
        ));
    }
    Ok(())
}

impl ChatHistory {
    /// Append one exchange to a session and update its metadata
    ///
    /// Appends to the same session are serialized. The pair is written
    /// first; the session's title, count and recency are then updated and
    /// the updated record is returned.
    ///
    /// # Errors
    ///
    /// - `VaidyaError::Validation` if either text is empty or whitespace only
    ///   (nothing written)
    /// - `VaidyaError::NotFound` if the session does not exist
    /// - `VaidyaError::Storage` if a write fails; when the metadata step
    ///   fails the pair is already stored and the count is stale until the
    ///   session is reconciled
    pub async fn append_pair(
        &self,
        owner_id: &str,
        session_id: &str,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<Session> {
        validate_pair(user_text, assistant_text)?;

        let _guard = self.locks.acquire(session_id).await;

        let session = self.get_session(owner_id, session_id).await?;
        let now = current_time();

        let pair = self
            .store
            .create_pair(owner_id, session_id, user_text, assistant_text, now)
            .await?;
        tracing::debug!(
            session_id,
            seq = pair.seq,
            user_len = user_text.len(),
            assistant_len = assistant_text.len(),
            "Appended message pair"
        );

        self.update_after_append(owner_id, &session, user_text, now)
            .await
            .map_err(|e| {
                tracing::warn!(
                    session_id,
                    "Message pair stored but session metadata is stale: {}",
                    e
                );
                e
            })
    }

    /// All pairs of a session in conversation order
    ///
    /// # Errors
    ///
    /// Returns `VaidyaError::NotFound` if the session does not exist.
    pub async fn list_pairs(&self, owner_id: &str, session_id: &str) -> Result<Vec<MessagePair>> {
        self.get_session(owner_id, session_id).await?;
        self.store.query_pairs(owner_id, session_id).await
    }
}

#[cfg(test)]
mod tests {
    use crate::error::VaidyaError;
    use crate::session::ChatHistory;
    use crate::storage::InMemoryStorage;
    use std::sync::Arc;

    fn history() -> ChatHistory {
        ChatHistory::new(Arc::new(InMemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_append_counts_and_orders_pairs() {
        let history = history();
        let session = history.create_session("alice", None).await.unwrap();

        for i in 0..5 {
            let updated = history
                .append_pair(
                    "alice",
                    &session.id,
                    &format!("question {}", i),
                    &format!("answer {}", i),
                )
                .await
                .unwrap();
            assert_eq!(updated.message_count, i + 1);
        }

        let pairs = history.list_pairs("alice", &session.id).await.unwrap();
        assert_eq!(pairs.len(), 5);
        for (i, pair) in pairs.iter().enumerate() {
            assert_eq!(pair.user_text, format!("question {}", i));
            assert_eq!(pair.assistant_text, format!("answer {}", i));
        }
    }

    #[tokio::test]
    async fn test_append_empty_user_text_changes_nothing() {
        let history = history();
        let session = history.create_session("alice", None).await.unwrap();

        let err = history
            .append_pair("alice", &session.id, "", "reply")
            .await
            .unwrap_err();
        assert!(matches!(err, VaidyaError::Validation(_)));

        let after = history.get_session("alice", &session.id).await.unwrap();
        assert_eq!(after, session);
        assert!(history
            .list_pairs("alice", &session.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_append_whitespace_only_user_text_is_rejected() {
        let history = history();
        let session = history.create_session("alice", None).await.unwrap();
        let err = history
            .append_pair("alice", &session.id, " \n\t ", "reply")
            .await
            .unwrap_err();
        assert!(matches!(err, VaidyaError::Validation(_)));
        assert_eq!(
            history.get_session("alice", &session.id).await.unwrap(),
            session
        );
    }

    #[tokio::test]
    async fn test_append_empty_assistant_text_is_rejected() {
        let history = history();
        let session = history.create_session("alice", None).await.unwrap();
        let err = history
            .append_pair("alice", &session.id, "Is turmeric good?", "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, VaidyaError::Validation(_)));
    }

    #[tokio::test]
    async fn test_append_to_missing_session_is_not_found() {
        let history = history();
        let err = history
            .append_pair("alice", "missing", "q", "a")
            .await
            .unwrap_err();
        assert!(matches!(err, VaidyaError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_serialized() {
        let history = Arc::new(history());
        let session = history.create_session("alice", None).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..10 {
            let history = Arc::clone(&history);
            let id = session.id.clone();
            handles.push(tokio::spawn(async move {
                history
                    .append_pair("alice", &id, &format!("q{}", i), "a")
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let session = history.get_session("alice", &session.id).await.unwrap();
        assert_eq!(session.message_count, 10);
        assert_eq!(
            history.list_pairs("alice", &session.id).await.unwrap().len(),
            10
        );
    }
}
