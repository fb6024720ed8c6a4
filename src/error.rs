//! Error types for Vaidya
//!
//! This module defines all error types used throughout the library,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Category of a failed language-model call
///
/// The upstream service reports failures in many shapes; they are folded
/// into these categories so the caller can show a short, specific notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamKind {
    /// The API key was rejected (401/403)
    Auth,
    /// Quota or rate limit exhausted (429)
    Quota,
    /// The service could not be reached
    Network,
    /// The response was blocked by safety filters
    Safety,
    /// The request was malformed or rejected (400)
    InvalidRequest,
    /// The model or endpoint is not available (404)
    Unavailable,
    /// The call exceeded the configured timeout
    Timeout,
    /// Anything else, including unparseable responses
    Other,
}

impl UpstreamKind {
    /// Short user-facing notice for this category
    pub fn notice(&self) -> &'static str {
        match self {
            UpstreamKind::Auth => "Invalid API key. Please check your API key configuration.",
            UpstreamKind::Quota => "API quota exceeded. Please try again later.",
            UpstreamKind::Network => "Network error. Please check your internet connection.",
            UpstreamKind::Safety => {
                "Response blocked by safety filters. Please rephrase your question."
            }
            UpstreamKind::InvalidRequest => "Invalid request. Please try a different question.",
            UpstreamKind::Unavailable => {
                "API service not available. Please ensure the model is enabled for your key."
            }
            UpstreamKind::Timeout => "The assistant took too long to respond. Please try again.",
            UpstreamKind::Other => "Unable to generate a response. Please try again.",
        }
    }
}

impl std::fmt::Display for UpstreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UpstreamKind::Auth => "auth",
            UpstreamKind::Quota => "quota",
            UpstreamKind::Network => "network",
            UpstreamKind::Safety => "safety",
            UpstreamKind::InvalidRequest => "invalid_request",
            UpstreamKind::Unavailable => "unavailable",
            UpstreamKind::Timeout => "timeout",
            UpstreamKind::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Main error type for Vaidya operations
///
/// The first four variants form the session-layer taxonomy; the rest are
/// ambient failures from configuration loading and I/O.
#[derive(Error, Debug)]
pub enum VaidyaError {
    /// Bad input rejected before any write is attempted
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown session or owner
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persistence layer unreachable or a write failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Language-model call failed
    #[error("Upstream error ({kind}): {message}")]
    Upstream {
        /// Failure category
        kind: UpstreamKind,
        /// Detail from the provider
        message: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl VaidyaError {
    /// Build an upstream error of the given kind
    pub fn upstream(kind: UpstreamKind, message: impl Into<String>) -> Self {
        Self::Upstream {
            kind,
            message: message.into(),
        }
    }

    /// Returns `true` for failures the user may simply retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Upstream { .. })
    }

    /// Short message suitable for showing to an end user
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::NotFound(what) => format!("{} could not be found.", what),
            Self::Storage(_) => "Could not save or load your chats. Please try again.".to_string(),
            Self::Upstream { kind, .. } => kind.notice().to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for Vaidya operations
///
/// Session-layer callers match on [`VaidyaError`] variants, so the error
/// type stays concrete rather than `anyhow::Error`.
pub type Result<T> = std::result::Result<T, VaidyaError>;
