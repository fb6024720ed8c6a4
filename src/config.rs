//! Configuration management for Vaidya
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, VaidyaError};
use crate::storage::DEFAULT_SESSION_TITLE;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Vaidya
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Language model provider settings
    pub provider: ProviderConfig,
    /// Chat history storage settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Chat behavior settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// Whose sessions this process works on
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// Provider configuration
///
/// Specifies which language model provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type")]
    pub provider_type: String,

    /// Google Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

/// Google Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model to use for Gemini
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API key; usually supplied through the environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Optional API base URL (useful for tests and local mocks)
    #[serde(default)]
    pub api_base: Option<String>,
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_gemini_model(),
            api_key: None,
            api_base: None,
        }
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model to use for Ollama
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:latest".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
        }
    }
}

/// Chat history storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend: "sqlite" or "memory"
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    /// SQLite database path; defaults to the per-user data directory
    #[serde(default)]
    pub path: Option<String>,
}

fn default_storage_backend() -> String {
    "sqlite".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            path: None,
        }
    }
}

/// Chat behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Title given to sessions before their first message
    #[serde(default = "default_title")]
    pub default_title: String,

    /// Number of recent transcript messages included in each prompt
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Timeout for a single provider request (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Minimum accepted question length after trimming
    #[serde(default = "default_min_input_chars")]
    pub min_input_chars: usize,

    /// Maximum accepted question length
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

fn default_title() -> String {
    DEFAULT_SESSION_TITLE.to_string()
}

fn default_history_window() -> usize {
    5
}

fn default_request_timeout() -> u64 {
    60
}

fn default_min_input_chars() -> usize {
    2
}

fn default_max_input_chars() -> usize {
    1000
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_title: default_title(),
            history_window: default_history_window(),
            request_timeout_seconds: default_request_timeout(),
            min_input_chars: default_min_input_chars(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

/// Identity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Owner id attached to every session this process creates
    #[serde(default = "default_owner_id")]
    pub owner_id: String,
}

fn default_owner_id() -> String {
    "local".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            owner_id: default_owner_id(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            provider: ProviderConfig {
                provider_type: "gemini".to_string(),
                gemini: GeminiConfig::default(),
                ollama: OllamaConfig::default(),
            },
            storage: StorageConfig::default(),
            chat: ChatConfig::default(),
            identity: IdentityConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| VaidyaError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| VaidyaError::Config(format!("Failed to parse config: {}", e)))
    }

    fn apply_env_vars(&mut self) {
        // Provider overrides
        if let Ok(provider_type) = std::env::var("VAIDYA_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(model) = std::env::var("VAIDYA_GEMINI_MODEL") {
            self.provider.gemini.model = model;
        }

        if let Ok(key) =
            std::env::var("VAIDYA_GEMINI_API_KEY").or_else(|_| std::env::var("GEMINI_API_KEY"))
        {
            self.provider.gemini.api_key = Some(key);
        }

        if let Ok(ollama_host) = std::env::var("VAIDYA_OLLAMA_HOST") {
            self.provider.ollama.host = ollama_host;
        }

        if let Ok(ollama_model) = std::env::var("VAIDYA_OLLAMA_MODEL") {
            self.provider.ollama.model = ollama_model;
        }

        // Storage and identity overrides
        if let Ok(db_path) = std::env::var("VAIDYA_HISTORY_DB") {
            self.storage.path = Some(db_path);
        }

        if let Ok(user) = std::env::var("VAIDYA_USER") {
            self.identity.owner_id = user;
        }

        // Chat overrides
        if let Ok(window) = std::env::var("VAIDYA_HISTORY_WINDOW") {
            if let Ok(value) = window.parse() {
                self.chat.history_window = value;
            } else {
                tracing::warn!("Invalid VAIDYA_HISTORY_WINDOW: {}", window);
            }
        }

        if let Ok(timeout) = std::env::var("VAIDYA_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.chat.request_timeout_seconds = value;
            } else {
                tracing::warn!("Invalid VAIDYA_TIMEOUT_SECONDS: {}", timeout);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(path) = &cli.storage_path {
            self.storage.path = Some(path.clone());
        }

        if let Some(user) = &cli.user {
            self.identity.owner_id = user.clone();
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `VaidyaError::Config` if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(VaidyaError::Config(
                "Provider type cannot be empty".to_string(),
            ));
        }

        let valid_providers = ["gemini", "ollama"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(VaidyaError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            )));
        }

        let valid_backends = ["sqlite", "memory"];
        if !valid_backends.contains(&self.storage.backend.as_str()) {
            return Err(VaidyaError::Config(format!(
                "Invalid storage backend: {}. Must be one of: {}",
                self.storage.backend,
                valid_backends.join(", ")
            )));
        }

        if self.identity.owner_id.trim().is_empty() {
            return Err(VaidyaError::Config(
                "identity.owner_id cannot be empty".to_string(),
            ));
        }

        if self.chat.history_window == 0 {
            return Err(VaidyaError::Config(
                "chat.history_window must be greater than 0".to_string(),
            ));
        }

        if self.chat.request_timeout_seconds == 0 {
            return Err(VaidyaError::Config(
                "chat.request_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.chat.min_input_chars > self.chat.max_input_chars {
            return Err(VaidyaError::Config(format!(
                "chat.min_input_chars ({}) cannot exceed chat.max_input_chars ({})",
                self.chat.min_input_chars, self.chat.max_input_chars
            )));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
