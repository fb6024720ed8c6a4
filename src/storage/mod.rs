//! Persistence for chat sessions and their message pairs
//!
//! The [`DocumentStore`] trait is the keyed-document seam the session layer
//! writes through. Two backends are provided: [`SqliteStorage`] for on-disk
//! history and [`InMemoryStorage`] for ephemeral runs and tests.

use crate::config::StorageConfig;
use crate::error::{Result, VaidyaError};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use std::sync::Arc;

pub mod memory;
pub mod sqlite;
pub mod types;

pub use memory::InMemoryStorage;
pub use sqlite::SqliteStorage;
pub use types::{MessagePair, Session, SessionUpdate, DEFAULT_SESSION_TITLE};

/// Owner-scoped document store for sessions and message pairs
///
/// Every operation is keyed by `owner_id`; a session belonging to another
/// owner behaves exactly like a missing one.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name used in logs
    fn backend(&self) -> &'static str;

    /// Create a session with a freshly generated id
    async fn create_session(
        &self,
        owner_id: &str,
        title: &str,
        now: DateTime<Utc>,
    ) -> Result<Session>;

    /// Fetch one session, `None` if it does not exist for this owner
    async fn get_session(&self, owner_id: &str, session_id: &str) -> Result<Option<Session>>;

    /// Apply a partial update and return the new record, `None` if missing
    async fn update_session(
        &self,
        owner_id: &str,
        session_id: &str,
        update: &SessionUpdate,
    ) -> Result<Option<Session>>;

    /// Delete a session record; returns whether a record was removed
    async fn delete_session(&self, owner_id: &str, session_id: &str) -> Result<bool>;

    /// All sessions for an owner, most recently updated first
    async fn query_sessions(&self, owner_id: &str) -> Result<Vec<Session>>;

    /// Append a pair to a session's log
    async fn create_pair(
        &self,
        owner_id: &str,
        session_id: &str,
        user_text: &str,
        assistant_text: &str,
        now: DateTime<Utc>,
    ) -> Result<MessagePair>;

    /// All pairs of a session, ascending by timestamp then insertion order
    async fn query_pairs(&self, owner_id: &str, session_id: &str) -> Result<Vec<MessagePair>>;

    /// Remove all pairs of a session; returns how many were removed
    async fn delete_pairs(&self, owner_id: &str, session_id: &str) -> Result<usize>;
}

/// Open the store selected by configuration
///
/// # Errors
///
/// Returns `VaidyaError::Config` for an unknown backend and
/// `VaidyaError::Storage` if the SQLite file cannot be initialized.
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.backend.as_str() {
        "sqlite" => {
            let storage = match &config.path {
                Some(path) => SqliteStorage::new_with_path(path)?,
                None => SqliteStorage::new()?,
            };
            Ok(Arc::new(storage))
        }
        "memory" => Ok(Arc::new(InMemoryStorage::new())),
        other => Err(VaidyaError::Config(format!(
            "Unknown storage backend: {}",
            other
        ))),
    }
}

/// Generate a new session identifier
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current time at the precision the stores keep (microseconds)
pub fn current_time() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 rendering so lexical order equals time order
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| VaidyaError::Storage(format!("Invalid stored timestamp {}: {}", raw, e)))
}
