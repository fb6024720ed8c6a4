//! Display-ready transcripts
//!
//! A transcript is the greeting followed by every stored pair expanded into
//! a user message and an assistant message.

use super::ChatHistory;
use crate::error::Result;
use crate::storage::MessagePair;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed assistant message shown at the top of every transcript
///
/// Never persisted and never counted in `message_count`.
pub const GREETING: &str = "Hello! 🌿 I'm your Ayurvedic wellness assistant powered by AI. \
I can help answer questions about natural remedies, health conditions, diet, lifestyle, \
and holistic wellness. How can I assist you today?";

/// Author of a displayed message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Lowercase role name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message of a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMessage {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl DisplayMessage {
    /// The synthetic greeting, stamped with the given time
    pub fn greeting(at: DateTime<Utc>) -> Self {
        Self {
            role: Role::Assistant,
            text: GREETING.to_string(),
            timestamp: at,
        }
    }
}

/// Expand stored pairs into a transcript
///
/// Both halves of a pair carry the pair's timestamp; the assistant reply
/// does not get a later one of its own.
pub fn transcript_from_pairs(greeting_at: DateTime<Utc>, pairs: &[MessagePair]) -> Vec<DisplayMessage> {
    let mut messages = Vec::with_capacity(1 + pairs.len() * 2);
    messages.push(DisplayMessage::greeting(greeting_at));
    for pair in pairs {
        messages.push(DisplayMessage {
            role: Role::User,
            text: pair.user_text.clone(),
            timestamp: pair.timestamp,
        });
        messages.push(DisplayMessage {
            role: Role::Assistant,
            text: pair.assistant_text.clone(),
            timestamp: pair.timestamp,
        });
    }
    messages
}

impl ChatHistory {
    /// Rebuild the display transcript of a session
    ///
    /// Reads the stored pairs directly, so the result is correct even when
    /// the session's `message_count` is stale. The greeting is stamped with
    /// the session's creation time.
    ///
    /// # Errors
    ///
    /// Returns `VaidyaError::NotFound` if the session does not exist.
    pub async fn build_transcript(
        &self,
        owner_id: &str,
        session_id: &str,
    ) -> Result<Vec<DisplayMessage>> {
        let session = self.get_session(owner_id, session_id).await?;
        let pairs = self.store.query_pairs(owner_id, session_id).await?;
        tracing::debug!(session_id, pairs = pairs.len(), "Building transcript");
        Ok(transcript_from_pairs(session.created_at, &pairs))
    }
}
