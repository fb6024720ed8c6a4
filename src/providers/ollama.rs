//! Ollama provider implementation for Vaidya
//!
//! This module implements the Provider trait for Ollama, connecting to a local
//! or remote Ollama server through its non-streaming chat endpoint.

use crate::config::OllamaConfig;
use crate::error::{Result, UpstreamKind, VaidyaError};
use crate::providers::{Message, Provider};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama API provider
///
/// # Examples
///
/// ```no_run
/// use vaidya::config::OllamaConfig;
/// use vaidya::providers::{Message, OllamaProvider, Provider};
///
/// # async fn example() -> vaidya::error::Result<()> {
/// let provider = OllamaProvider::new(OllamaConfig::default())?;
/// let reply = provider.complete(&[Message::user("Hello!")]).await?;
/// # Ok(())
/// # }
/// ```
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

/// Request structure for Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    stream: bool,
}

/// Message structure for Ollama API
#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    #[serde(default)]
    content: String,
}

/// Response structure from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    prompt_eval_count: usize,
    #[serde(default)]
    eval_count: usize,
}

impl OllamaProvider {
    /// Create a new Ollama provider instance
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("vaidya/", env!("CARGO_PKG_VERSION")))
            .build()?;

        tracing::info!(
            "Initialized Ollama provider: host={}, model={}",
            config.host,
            config.model
        );

        Ok(Self { client, config })
    }

    /// Get the configured Ollama host
    pub fn host(&self) -> &str {
        &self.config.host
    }

    fn convert_messages(messages: &[Message]) -> Vec<OllamaMessage> {
        messages
            .iter()
            .map(|m| OllamaMessage {
                role: m.role.clone(),
                content: m.content.clone(),
            })
            .collect()
    }

    fn classify_status(status: StatusCode) -> UpstreamKind {
        match status {
            StatusCode::NOT_FOUND => UpstreamKind::Unavailable,
            StatusCode::BAD_REQUEST => UpstreamKind::InvalidRequest,
            StatusCode::TOO_MANY_REQUESTS => UpstreamKind::Quota,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => UpstreamKind::Auth,
            _ => UpstreamKind::Other,
        }
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let url = format!("{}/api/chat", self.config.host.trim_end_matches('/'));
        let request = OllamaRequest {
            model: &self.config.model,
            messages: Self::convert_messages(messages),
            stream: false,
        };

        tracing::debug!("Sending Ollama request: {} messages", request.messages.len());

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Ollama request failed: {}", e);
                let kind = if e.is_timeout() {
                    UpstreamKind::Timeout
                } else {
                    UpstreamKind::Network
                };
                VaidyaError::upstream(kind, format!("Ollama request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Ollama returned error {}: {}", status, error_text);
            return Err(VaidyaError::upstream(
                Self::classify_status(status),
                format!("Ollama returned error {}: {}", status, error_text),
            ));
        }

        let body: OllamaResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Ollama response: {}", e);
            VaidyaError::upstream(
                UpstreamKind::Other,
                format!("Failed to parse Ollama response: {}", e),
            )
        })?;

        tracing::debug!(
            "Ollama response: done={}, prompt_tokens={}, completion_tokens={}",
            body.done,
            body.prompt_eval_count,
            body.eval_count
        );

        let text = body.message.content;
        if text.trim().is_empty() {
            return Err(VaidyaError::upstream(
                UpstreamKind::Other,
                "Ollama returned an empty reply",
            ));
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }
}
