//! Derived session metadata
//!
//! After every append the session's message count and recency are updated,
//! and the first message also supplies the session title.

use super::ChatHistory;
use crate::error::{Result, VaidyaError};
use crate::storage::{current_time, Session, SessionUpdate};
use chrono::{DateTime, Utc};

/// Maximum number of characters of the first message used as a title
pub const TITLE_MAX_CHARS: usize = 50;

/// Appended to titles cut at [`TITLE_MAX_CHARS`]
pub const TITLE_ELLIPSIS: &str = "…";

/// Derive a session title from the first user message
///
/// Cuts at exactly [`TITLE_MAX_CHARS`] characters of the raw text, with no
/// word-boundary adjustment, and appends [`TITLE_ELLIPSIS`] only when
/// something was cut.
///
/// # Examples
///
/// ```
/// use vaidya::session::derive_title;
///
/// assert_eq!(derive_title("What helps a headache?"), "What helps a headache?");
/// let long = "a".repeat(60);
/// assert_eq!(derive_title(&long), format!("{}…", "a".repeat(50)));
/// ```
pub fn derive_title(user_text: &str) -> String {
    match user_text.char_indices().nth(TITLE_MAX_CHARS) {
        Some((cut, _)) => format!("{}{}", &user_text[..cut], TITLE_ELLIPSIS),
        None => user_text.to_string(),
    }
}

/// The update that follows appending one pair to `session`
fn append_update(session: &Session, user_text: &str, now: DateTime<Utc>) -> SessionUpdate {
    let update = SessionUpdate::touch(now).with_message_count(session.message_count + 1);
    if session.message_count == 0 {
        update.with_title(derive_title(user_text))
    } else {
        update
    }
}

impl ChatHistory {
    /// Apply the post-append metadata update and return the new record
    ///
    /// `session` is the record as read before the pair was written; the
    /// caller holds the session lock.
    pub(crate) async fn update_after_append(
        &self,
        owner_id: &str,
        session: &Session,
        user_text: &str,
        now: DateTime<Utc>,
    ) -> Result<Session> {
        let update = append_update(session, user_text, now);
        if update.title.is_some() {
            tracing::debug!(session_id = %session.id, "Deriving title from first message");
        }

        self.store
            .update_session(owner_id, &session.id, &update)
            .await?
            .ok_or_else(|| VaidyaError::NotFound(format!("Session {}", session.id)))
    }

    /// Bring a session's count and title back in line with its stored pairs
    ///
    /// Repairs the state left behind when a metadata update failed after
    /// its pair was written. Returns the session unchanged if nothing is off.
    ///
    /// # Errors
    ///
    /// Returns `VaidyaError::NotFound` if the session does not exist.
    pub async fn reconcile_session(&self, owner_id: &str, session_id: &str) -> Result<Session> {
        let _guard = self.locks.acquire(session_id).await;

        let session = self.get_session(owner_id, session_id).await?;
        let pairs = self.store.query_pairs(owner_id, session_id).await?;
        let actual = pairs.len() as u64;

        if actual == session.message_count {
            return Ok(session);
        }

        tracing::warn!(
            session_id,
            recorded = session.message_count,
            actual,
            "Reconciling stale session metadata"
        );

        let mut update = SessionUpdate::touch(current_time()).with_message_count(actual);
        if session.message_count == 0 {
            if let Some(first) = pairs.first() {
                update = update.with_title(derive_title(&first.user_text));
            }
        }

        self.store
            .update_session(owner_id, session_id, &update)
            .await?
            .ok_or_else(|| VaidyaError::NotFound(format!("Session {}", session_id)))
    }
}
