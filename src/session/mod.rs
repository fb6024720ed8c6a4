//! Chat session bookkeeping
//!
//! [`ChatHistory`] is the single entry point the rest of the application
//! uses to create sessions, append message pairs and read history back.
//! It wraps an injected [`DocumentStore`] and serializes writes per session.
//!
//! # Architecture
//!
//! - `store`: session create/get/rename/delete
//! - `log`: append-only message pairs
//! - `metadata`: title derivation and message counting after each append
//! - `transcript`: display-ready message sequence with the greeting
//! - `lister`: recency-ordered history view
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use vaidya::session::ChatHistory;
//! use vaidya::storage::InMemoryStorage;
//!
//! # tokio_test::block_on(async {
//! let history = ChatHistory::new(Arc::new(InMemoryStorage::new()));
//! let session = history.create_session("alice", None).await.unwrap();
//! let session = history
//!     .append_pair("alice", &session.id, "What helps a headache?", "Try ginger tea and rest.")
//!     .await
//!     .unwrap();
//! assert_eq!(session.message_count, 1);
//! assert_eq!(session.title, "What helps a headache?");
//! # });
//! ```

use crate::error::{Result, VaidyaError};
use crate::storage::{DocumentStore, DEFAULT_SESSION_TITLE};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

pub mod lister;
pub mod log;
pub mod metadata;
pub mod store;
pub mod transcript;

pub use lister::SessionSummary;
pub use metadata::{derive_title, TITLE_ELLIPSIS, TITLE_MAX_CHARS};
pub use transcript::{transcript_from_pairs, DisplayMessage, Role, GREETING};

/// Per-session async locks keyed by session id
///
/// Entries live only while some caller holds or awaits the lock.
#[derive(Default)]
struct SessionLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionLocks {
    fn lock_for(&self, session_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.entry(session_id.to_string()).or_default().clone()
    }

    /// Wait for exclusive access to one session
    async fn acquire(&self, session_id: &str) -> SessionGuard<'_> {
        let guard = self.lock_for(session_id).lock_owned().await;
        SessionGuard {
            locks: self,
            session_id: session_id.to_string(),
            guard: Some(guard),
        }
    }

    fn prune(&self, session_id: &str) {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if map
            .get(session_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(session_id);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Held session lock; drops its map entry once nobody else wants it
struct SessionGuard<'a> {
    locks: &'a SessionLocks,
    session_id: String,
    guard: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.prune(&self.session_id);
    }
}

/// Session store, message log and read paths over one document store
pub struct ChatHistory {
    store: Arc<dyn DocumentStore>,
    locks: SessionLocks,
    default_title: String,
}

impl ChatHistory {
    /// Create a history service over the given store
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            locks: SessionLocks::default(),
            default_title: DEFAULT_SESSION_TITLE.to_string(),
        }
    }

    /// Override the title new sessions start with
    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    /// Title used by `create_session` when none is given
    pub fn default_title(&self) -> &str {
        &self.default_title
    }

    /// Name of the underlying storage backend
    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Resolve a full session id or a unique id prefix
    ///
    /// # Errors
    ///
    /// Returns `VaidyaError::NotFound` when nothing matches and
    /// `VaidyaError::Validation` when the prefix is empty or ambiguous.
    pub async fn resolve_session_id(&self, owner_id: &str, id_or_prefix: &str) -> Result<String> {
        let id_or_prefix = id_or_prefix.trim();
        if id_or_prefix.is_empty() {
            return Err(VaidyaError::Validation("Session id cannot be empty".into()));
        }

        if self.store.get_session(owner_id, id_or_prefix).await?.is_some() {
            return Ok(id_or_prefix.to_string());
        }

        let matches: Vec<String> = self
            .store
            .query_sessions(owner_id)
            .await?
            .into_iter()
            .filter(|s| s.id.starts_with(id_or_prefix))
            .map(|s| s.id)
            .collect();

        match matches.as_slice() {
            [] => Err(VaidyaError::NotFound(format!("Session {}", id_or_prefix))),
            [id] => Ok(id.clone()),
            _ => Err(VaidyaError::Validation(format!(
                "Session prefix {} matches {} sessions",
                id_or_prefix,
                matches.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;

    fn history() -> ChatHistory {
        ChatHistory::new(Arc::new(InMemoryStorage::new()))
    }

    #[test]
    fn test_lock_for_returns_same_lock_per_session() {
        let locks = SessionLocks::default();
        let a = locks.lock_for("s1");
        let b = locks.lock_for("s1");
        let c = locks.lock_for("s2");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[tokio::test]
    async fn test_released_lock_entry_is_pruned() {
        let locks = SessionLocks::default();
        {
            let _guard = locks.acquire("s1").await;
            assert_eq!(locks.len(), 1);
        }
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_entry_kept_while_another_caller_waits() {
        let locks = Arc::new(SessionLocks::default());
        let first = locks.acquire("s1").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("s1").await;
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        drop(first);
        assert_eq!(locks.len(), 1);
        waiter.await.unwrap();
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_failed_operations_leave_no_lock_entries() {
        let history = history();
        for i in 0..50 {
            let id = format!("missing-{}", i);
            assert!(history.append_pair("alice", &id, "q", "a").await.is_err());
            assert!(history.rename_session("alice", &id, "t").await.is_err());
            assert!(history.reconcile_session("alice", &id).await.is_err());
            assert!(history.delete_session("alice", &id).await.is_err());
        }
        assert_eq!(history.locks.len(), 0);

        let session = history.create_session("alice", None).await.unwrap();
        history
            .append_pair("alice", &session.id, "q", "a")
            .await
            .unwrap();
        assert_eq!(history.locks.len(), 0);
    }

    #[tokio::test]
    async fn test_resolve_full_id_and_prefix() {
        let history = history();
        let session = history.create_session("alice", None).await.unwrap();

        assert_eq!(
            history
                .resolve_session_id("alice", &session.id)
                .await
                .unwrap(),
            session.id
        );
        assert_eq!(
            history
                .resolve_session_id("alice", &session.id[..8])
                .await
                .unwrap(),
            session.id
        );
    }

    #[tokio::test]
    async fn test_resolve_unknown_prefix_is_not_found() {
        let history = history();
        history.create_session("alice", None).await.unwrap();
        let err = history
            .resolve_session_id("alice", "zzzzzzzz-not-a-uuid")
            .await
            .unwrap_err();
        assert!(matches!(err, VaidyaError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_ambiguous_prefix_is_validation_error() {
        let history = history();
        let mut first_chars = HashMap::new();
        for _ in 0..17 {
            let session = history.create_session("alice", None).await.unwrap();
            *first_chars.entry(session.id[..1].to_string()).or_insert(0) += 1;
        }
        // 17 ids over 16 hex digits: some leading digit repeats
        let shared = first_chars
            .into_iter()
            .find(|(_, count)| *count > 1)
            .map(|(prefix, _)| prefix)
            .unwrap();

        let err = history
            .resolve_session_id("alice", &shared)
            .await
            .unwrap_err();
        assert!(matches!(err, VaidyaError::Validation(_)));
    }

    #[tokio::test]
    async fn test_resolve_empty_prefix_is_rejected() {
        let history = history();
        let session = history.create_session("alice", None).await.unwrap();

        for blank in ["", "   "] {
            let err = history.resolve_session_id("alice", blank).await.unwrap_err();
            assert!(matches!(err, VaidyaError::Validation(_)));
        }
        assert!(history.get_session("alice", &session.id).await.is_ok());
    }

    #[test]
    fn test_default_title_override() {
        let history = history().with_default_title("Fresh chat");
        assert_eq!(history.default_title(), "Fresh chat");
        assert_eq!(history.backend(), "memory");
    }
}
