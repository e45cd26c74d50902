//! LLM provider abstraction layer
//!
//! The rest of the application treats the model as an opaque
//! `generate(prompt) -> text` function. Providers implement [`Backend`].

pub use async_trait::async_trait;

pub mod factory;
pub mod gemini;
pub mod retry_utils;

pub use self::factory::create_backend;
pub use self::gemini::GeminiBackend;
use thiserror::Error;

/// Common trait for all LLM backends
#[async_trait]
pub trait Backend: Send + Sync {
    /// Send a prompt to the model and return its text reply
    ///
    /// Implementations must not return partial output on failure.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Get the provider name
    fn name(&self) -> &str;

    /// Get the model name
    fn model(&self) -> &str;
}

/// Error types for LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// API request error
    #[error("API error: {0}")]
    ApiError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Rate limit error
    #[error("Rate limit exceeded{}", retry_after_suffix(.retry_after))]
    RateLimitError { retry_after: Option<u64> },

    /// The provider refused to answer the prompt
    #[error("Request blocked by the provider: {0}")]
    Blocked(String),
}

fn retry_after_suffix(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(seconds) => format!(". Retry after {} seconds", seconds),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_display() {
        let err = LlmError::RateLimitError {
            retry_after: Some(12),
        };
        assert_eq!(err.to_string(), "Rate limit exceeded. Retry after 12 seconds");

        let err = LlmError::RateLimitError { retry_after: None };
        assert_eq!(err.to_string(), "Rate limit exceeded");
    }

    #[test]
    fn test_api_error_display() {
        let err = LlmError::ApiError("boom".to_string());
        assert_eq!(err.to_string(), "API error: boom");
    }
}
