//! Chat turn service
//!
//! [`Assistant`] ties a provider to the session layer: each question is
//! validated, answered with the recent transcript as context, and stored as
//! one message pair.

use crate::config::ChatConfig;
use crate::error::{Result, UpstreamKind, VaidyaError};
use crate::prompts::{build_prompt, quick_remedies_prompt, validate_user_input, Condition};
use crate::providers::{Message, Provider};
use crate::session::{transcript_from_pairs, ChatHistory};
use crate::storage::Session;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of one answered question
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// Session record after the pair was stored
    pub session: Session,
    /// The assistant's reply
    pub reply: String,
}

/// Wellness assistant over a chat history and a language model provider
pub struct Assistant {
    history: Arc<ChatHistory>,
    provider: Arc<dyn Provider>,
    chat: ChatConfig,
}

impl Assistant {
    /// Create an assistant
    pub fn new(history: Arc<ChatHistory>, provider: Arc<dyn Provider>, chat: ChatConfig) -> Self {
        Self {
            history,
            provider,
            chat,
        }
    }

    /// The chat history this assistant writes to
    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Start a fresh session with the configured default title
    pub async fn start_session(&self, owner_id: &str) -> Result<Session> {
        self.history
            .create_session(owner_id, Some(self.chat.default_title.as_str()))
            .await
    }

    /// Answer a question within a session and record the exchange
    ///
    /// Surrounding whitespace is dropped before the question is validated,
    /// sent and stored. Nothing is stored when validation or the provider
    /// call fails.
    ///
    /// # Errors
    ///
    /// - `VaidyaError::Validation` if the question is too short or too long
    /// - `VaidyaError::NotFound` if the session does not exist
    /// - `VaidyaError::Upstream` if the provider fails or times out
    /// - `VaidyaError::Storage` if the exchange cannot be stored
    pub async fn ask(
        &self,
        owner_id: &str,
        session_id: &str,
        text: &str,
        condition: Option<&Condition>,
    ) -> Result<ChatTurn> {
        let text = text.trim();
        validate_user_input(text, self.chat.min_input_chars, self.chat.max_input_chars)?;

        let mut session = self.history.get_session(owner_id, session_id).await?;
        let pairs = self.history.list_pairs(owner_id, session_id).await?;
        if pairs.len() as u64 != session.message_count {
            session = self.history.reconcile_session(owner_id, session_id).await?;
        }

        let transcript = transcript_from_pairs(session.created_at, &pairs);
        let prompt = build_prompt(text, &transcript, condition, self.chat.history_window);
        tracing::debug!(
            session_id,
            provider = self.provider.name(),
            prompt_len = prompt.len(),
            "Asking provider"
        );

        let reply = self.complete(&[Message::user(prompt)]).await?;
        let session = self
            .history
            .append_pair(owner_id, session_id, text, &reply)
            .await?;

        Ok(ChatTurn { session, reply })
    }

    /// Short numbered remedies for a condition; not stored in any session
    pub async fn quick_remedies(&self, condition: &Condition) -> Result<String> {
        self.complete(&[Message::user(quick_remedies_prompt(condition))])
            .await
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let limit = Duration::from_secs(self.chat.request_timeout_seconds);
        match tokio::time::timeout(limit, self.provider.complete(messages)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    timeout_secs = self.chat.request_timeout_seconds,
                    "Provider call timed out"
                );
                Err(VaidyaError::upstream(
                    UpstreamKind::Timeout,
                    format!(
                        "No reply within {} seconds",
                        self.chat.request_timeout_seconds
                    ),
                ))
            }
        }
    }
}
