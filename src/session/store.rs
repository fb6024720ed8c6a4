//! Session record operations

use super::ChatHistory;
use crate::error::{Result, VaidyaError};
use crate::storage::{current_time, Session, SessionUpdate};

impl ChatHistory {
    /// Create a new session for `owner_id`
    ///
    /// Uses the configured default title when `title` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `VaidyaError::Validation` for an empty owner id and
    /// `VaidyaError::Storage` if the store rejects the write.
    pub async fn create_session(&self, owner_id: &str, title: Option<&str>) -> Result<Session> {
        if owner_id.trim().is_empty() {
            return Err(VaidyaError::Validation("Owner id cannot be empty".into()));
        }
        let title = title.unwrap_or(&self.default_title);

        let session = self
            .store
            .create_session(owner_id, title, current_time())
            .await?;
        tracing::info!(session_id = %session.id, owner_id, "Created chat session");
        Ok(session)
    }

    /// Fetch a session owned by `owner_id`
    ///
    /// # Errors
    ///
    /// Returns `VaidyaError::NotFound` if no such session exists for that owner.
    pub async fn get_session(&self, owner_id: &str, session_id: &str) -> Result<Session> {
        self.store
            .get_session(owner_id, session_id)
            .await?
            .ok_or_else(|| VaidyaError::NotFound(format!("Session {}", session_id)))
    }

    /// Overwrite a session's title and refresh `updated_at`
    ///
    /// Independent of the automatic first-message title.
    pub async fn rename_session(
        &self,
        owner_id: &str,
        session_id: &str,
        new_title: &str,
    ) -> Result<Session> {
        let new_title = new_title.trim();
        if new_title.is_empty() {
            return Err(VaidyaError::Validation("Title cannot be empty".into()));
        }

        let _guard = self.locks.acquire(session_id).await;

        let update = SessionUpdate::touch(current_time()).with_title(new_title);
        let session = self
            .store
            .update_session(owner_id, session_id, &update)
            .await?
            .ok_or_else(|| VaidyaError::NotFound(format!("Session {}", session_id)))?;

        tracing::info!(session_id, "Renamed chat session");
        Ok(session)
    }

    /// Delete a session and its message pairs
    ///
    /// The session record goes first so a failure while removing pairs
    /// leaves only unreachable rows behind. Returns the number of pairs removed.
    ///
    /// # Errors
    ///
    /// Returns `VaidyaError::NotFound` if the session does not exist.
    pub async fn delete_session(&self, owner_id: &str, session_id: &str) -> Result<usize> {
        let removed_pairs = {
            let _guard = self.locks.acquire(session_id).await;

            if !self.store.delete_session(owner_id, session_id).await? {
                return Err(VaidyaError::NotFound(format!("Session {}", session_id)));
            }

            self.store
                .delete_pairs(owner_id, session_id)
                .await
                .map_err(|e| {
                    tracing::warn!(session_id, "Session deleted but pairs remain: {}", e);
                    e
                })?
        };

        tracing::info!(session_id, removed_pairs, "Deleted chat session");
        Ok(removed_pairs)
    }
}
