//! Provider module for Vaidya
//!
//! This module contains the language model provider abstraction and
//! implementations for Google Gemini and Ollama.

pub mod base;
pub mod gemini;
pub mod ollama;

pub use base::{Message, Provider};
pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;

use crate::config::ProviderConfig;
use crate::error::{Result, VaidyaError};

/// Create a provider instance based on configuration
///
/// # Arguments
///
/// * `provider_type` - Type of provider ("gemini" or "ollama")
/// * `config` - Provider configuration
///
/// # Errors
///
/// Returns error if provider type is invalid or initialization fails
pub fn create_provider(provider_type: &str, config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    match provider_type {
        "gemini" => {
            let provider = GeminiProvider::new(config.gemini.clone())?;
            if !provider.is_configured() {
                tracing::warn!("Gemini API key is missing or looks invalid");
            }
            Ok(Box::new(provider))
        }
        "ollama" => Ok(Box::new(OllamaProvider::new(config.ollama.clone())?)),
        _ => Err(VaidyaError::Config(format!(
            "Unknown provider type: {}",
            provider_type
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_create_provider_by_name() {
        let config = Config::default().provider;
        assert_eq!(create_provider("gemini", &config).unwrap().name(), "gemini");
        assert_eq!(create_provider("ollama", &config).unwrap().name(), "ollama");
    }

    #[test]
    fn test_create_provider_unknown() {
        let config = Config::default().provider;
        let err = create_provider("openai", &config).err().unwrap();
        assert!(matches!(err, VaidyaError::Config(_)));
    }
}
