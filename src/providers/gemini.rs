//! Google Gemini provider implementation for Vaidya
//!
//! Talks to the Generative Language REST API (`generateContent`) and folds
//! its many failure shapes into [`UpstreamKind`] categories.

use crate::config::GeminiConfig;
use crate::error::{Result, UpstreamKind, VaidyaError};
use crate::providers::{Message, Provider};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Keys at or below this length are treated as placeholders
const MIN_API_KEY_LEN: usize = 20;

/// Gemini API provider
///
/// # Examples
///
/// ```no_run
/// use vaidya::config::GeminiConfig;
/// use vaidya::providers::{GeminiProvider, Message, Provider};
///
/// # async fn example() -> vaidya::error::Result<()> {
/// let config = GeminiConfig {
///     api_key: Some(std::env::var("GEMINI_API_KEY").unwrap_or_default()),
///     ..Default::default()
/// };
/// let provider = GeminiProvider::new(config)?;
/// let reply = provider.complete(&[Message::user("Benefits of triphala?")]).await?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Categorize a failed call from its HTTP status and error text
///
/// Status codes win; the text is only consulted for the markers the API
/// puts in otherwise generic errors.
pub fn classify_failure(status: Option<StatusCode>, message: &str) -> UpstreamKind {
    match status {
        Some(StatusCode::NOT_FOUND) => return UpstreamKind::Unavailable,
        Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => return UpstreamKind::Auth,
        Some(StatusCode::TOO_MANY_REQUESTS) => return UpstreamKind::Quota,
        _ => {}
    }

    if message.contains("API key") || message.contains("API_KEY") {
        UpstreamKind::Auth
    } else if message.contains("quota")
        || message.contains("QUOTA")
        || message.contains("RESOURCE_EXHAUSTED")
    {
        UpstreamKind::Quota
    } else if message.contains("SAFETY") {
        UpstreamKind::Safety
    } else if message.contains("INVALID_ARGUMENT") || status == Some(StatusCode::BAD_REQUEST) {
        UpstreamKind::InvalidRequest
    } else {
        UpstreamKind::Other
    }
}

impl GeminiProvider {
    /// Create a new Gemini provider instance
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("vaidya/", env!("CARGO_PKG_VERSION")))
            .build()?;

        tracing::info!(
            "Initialized Gemini provider: model={}, key_present={}",
            config.model,
            config.api_key.is_some()
        );

        Ok(Self { client, config })
    }

    /// `true` when an API key that looks real is configured
    pub fn is_configured(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|key| key.len() > MIN_API_KEY_LEN)
    }

    fn endpoint(&self) -> String {
        let base = self
            .config
            .api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/');
        format!("{}/v1beta/models/{}:generateContent", base, self.config.model)
    }

    fn build_request(messages: &[Message]) -> GenerateRequest {
        let system: Vec<Part> = messages
            .iter()
            .filter(|m| m.is_system())
            .map(|m| Part {
                text: m.content.clone(),
            })
            .collect();

        let contents = messages
            .iter()
            .filter(|m| !m.is_system())
            .map(|m| Content {
                role: Some(if m.role == "assistant" { "model" } else { "user" }.to_string()),
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            })
            .collect();

        GenerateRequest {
            contents,
            system_instruction: (!system.is_empty()).then_some(Content {
                role: None,
                parts: system,
            }),
        }
    }

    fn extract_text(body: GenerateResponse) -> Result<String> {
        if let Some(reason) = body.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(VaidyaError::upstream(
                classify_failure(None, &reason),
                format!("Prompt blocked: {}", reason),
            ));
        }

        let candidate = body.candidates.into_iter().next().ok_or_else(|| {
            VaidyaError::upstream(UpstreamKind::Other, "Gemini returned no candidates")
        })?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_default();
            return Err(VaidyaError::upstream(
                classify_failure(None, &reason),
                format!("Gemini returned no text (finish reason: {})", reason),
            ));
        }
        Ok(text)
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let key = self.config.api_key.as_deref().ok_or_else(|| {
            VaidyaError::upstream(UpstreamKind::Auth, "No Gemini API key configured")
        })?;

        let request = Self::build_request(messages);
        tracing::debug!(
            "Sending Gemini request: model={}, {} contents",
            self.config.model,
            request.contents.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                let kind = if e.is_timeout() {
                    UpstreamKind::Timeout
                } else {
                    UpstreamKind::Network
                };
                VaidyaError::upstream(kind, format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorEnvelope>(&raw)
                .map(|env| format!("{} {}", env.error.status, env.error.message))
                .unwrap_or(raw);
            tracing::error!("Gemini returned error {}: {}", status, detail);
            return Err(VaidyaError::upstream(
                classify_failure(Some(status), &detail),
                format!("Gemini returned error {}: {}", status, detail),
            ));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            VaidyaError::upstream(
                UpstreamKind::Other,
                format!("Failed to parse Gemini response: {}", e),
            )
        })?;

        Self::extract_text(body)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }
}
