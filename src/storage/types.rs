use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title every session starts with until its first message arrives
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// One persisted conversation thread owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for the session
    pub id: String,
    /// Identifier of the owning user
    pub owner_id: String,
    /// User-friendly title
    pub title: String,
    /// Number of stored message pairs
    pub message_count: u64,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the session was last appended to or renamed
    pub updated_at: DateTime<Utc>,
}

/// One stored exchange: a user question and the assistant's answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePair {
    /// Owning session
    pub session_id: String,
    /// User-authored text
    pub user_text: String,
    /// Assistant reply for `user_text`
    pub assistant_text: String,
    /// Append time; shared by both halves of the pair
    pub timestamp: DateTime<Utc>,
    /// Insertion sequence, breaks timestamp ties
    pub seq: u64,
}

/// Typed partial update of a session record
///
/// `None` fields are left untouched. `updated_at` is always written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUpdate {
    pub title: Option<String>,
    pub message_count: Option<u64>,
    pub updated_at: DateTime<Utc>,
}

impl SessionUpdate {
    /// An update that only refreshes `updated_at`
    pub fn touch(now: DateTime<Utc>) -> Self {
        Self {
            title: None,
            message_count: None,
            updated_at: now,
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the message count
    pub fn with_message_count(mut self, count: u64) -> Self {
        self.message_count = Some(count);
        self
    }

    /// Apply this update to an in-memory session record
    pub fn apply_to(&self, session: &mut Session) {
        if let Some(title) = &self.title {
            session.title = title.clone();
        }
        if let Some(count) = self.message_count {
            session.message_count = count;
        }
        session.updated_at = self.updated_at;
    }
}
