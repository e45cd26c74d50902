//! LLM backend factory
//!
//! Creates the backend for the configured model, inferring the provider from
//! the model name.

use crate::config::Config;
use crate::llm::gemini::GeminiBackend;
use crate::llm::retry_utils::RetryConfig;
use crate::llm::{Backend, LlmError};

/// Supported model provider types
#[derive(Debug, PartialEq, Eq)]
pub enum Provider {
    /// Google's Gemini models
    Google,
    /// Unknown provider
    Unknown(String),
}

/// Model information after parsing
#[derive(Debug, PartialEq, Eq)]
pub struct ModelInfo {
    /// The provider to use
    pub provider: Provider,
    /// The actual model name to pass to the API
    pub model_name: String,
}

/// Check if a model name is a Gemini model
fn is_gemini_model(model: &str) -> bool {
    model.to_lowercase().starts_with("gemini")
}

/// Parse a model string which may be in either format:
/// - "gemini-1.5-pro" (provider inferred from model name)
/// - "google/gemini-1.5-flash" (explicit provider)
pub fn parse_model_string(model_str: &str) -> ModelInfo {
    if let Some((provider, model)) = model_str.split_once('/') {
        let provider_type = match provider.trim().to_lowercase().as_str() {
            "google" | "gemini" => Provider::Google,
            other => Provider::Unknown(other.to_string()),
        };

        return ModelInfo {
            provider: provider_type,
            model_name: model.trim().to_string(),
        };
    }

    let provider = if is_gemini_model(model_str) {
        Provider::Google
    } else {
        Provider::Unknown(String::new())
    };

    ModelInfo {
        provider,
        model_name: model_str.trim().to_string(),
    }
}

/// Create an LLM backend from configuration
pub fn create_backend(config: &Config) -> Result<Box<dyn Backend>, LlmError> {
    let model_info = parse_model_string(&config.model);

    match model_info.provider {
        Provider::Google => {
            let retry = RetryConfig::with_limits(config.request_timeout_secs, config.max_attempts);
            let backend = GeminiBackend::new(config.api_key.clone(), model_info.model_name)?
                .with_base_url(config.api_base_url.clone())
                .with_retry_config(retry);
            Ok(Box::new(backend))
        }
        Provider::Unknown(provider) if provider.is_empty() => Err(LlmError::ConfigError(format!(
            "Cannot infer a provider for model '{}'. Use a Gemini model such as gemini-1.5-pro",
            config.model
        ))),
        Provider::Unknown(provider) => Err(LlmError::ConfigError(format!(
            "Unsupported provider '{}'. Only Google Gemini models are supported",
            provider
        ))),
    }
}
