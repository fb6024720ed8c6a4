//! Base provider trait and common types for Vaidya
//!
//! This module defines the Provider trait that all language model providers
//! must implement, along with the message type they exchange.

use crate::error::Result;
use crate::session::{DisplayMessage, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message structure for a provider request
///
/// Represents one turn sent to the language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use vaidya::providers::Message;
    ///
    /// let msg = Message::user("Is tulsi tea safe daily?");
    /// assert_eq!(msg.role, "user");
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// `true` for system messages
    pub fn is_system(&self) -> bool {
        self.role == "system"
    }
}

impl From<&DisplayMessage> for Message {
    fn from(message: &DisplayMessage) -> Self {
        match message.role {
            Role::User => Message::user(message.text.clone()),
            Role::Assistant => Message::assistant(message.text.clone()),
        }
    }
}

/// Language model provider
///
/// Implementations turn a message sequence into a single text reply.
/// Failures are reported as `VaidyaError::Upstream` with a category the
/// caller can show to the user.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Completes a conversation and returns the assistant's reply text
    ///
    /// # Errors
    ///
    /// Returns `VaidyaError::Upstream` if the API call fails, is blocked,
    /// or returns no text.
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// Short provider name used in logs
    fn name(&self) -> &str;

    /// Model the provider sends requests to
    fn model(&self) -> String;
}
