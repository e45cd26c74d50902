//! Shared retry and timeout utilities for LLM backends
//!
//! Each attempt is classified as a success, a permanent failure (client
//! errors other than 429) or a transient one (rate limiting, server errors,
//! timeouts and network failures). Transient failures are retried with
//! linear backoff and jitter until the attempt budget runs out.

use crate::llm::LlmError;
use rand::Rng;
use reqwest::StatusCode;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

/// Standard timeout and retry constants for LLM APIs
pub mod constants {
    /// Default timeout for a single generation request (120 seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Maximum waiting time between retries (30 seconds)
    pub const MAX_RETRY_DELAY_MS: u64 = 30_000;

    /// Default base delay for linear backoff (1 second)
    pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

    /// Default maximum attempts, including the first one
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
}

/// Retry policy for a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,

    /// Delay before the first retry; later retries wait a multiple of it
    pub base_delay_ms: u64,

    /// Upper bound for any single wait
    pub max_delay_ms: u64,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: constants::DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: constants::DEFAULT_BASE_DELAY_MS,
            max_delay_ms: constants::MAX_RETRY_DELAY_MS,
            timeout_secs: constants::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl RetryConfig {
    /// Default policy with a custom timeout and attempt budget
    pub fn with_limits(timeout_secs: u64, max_attempts: u32) -> Self {
        Self {
            timeout_secs,
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Wait before retry number `retry` (1-based): `retry * base`, ±10% jitter, capped
    pub fn backoff_delay_ms(&self, retry: u32) -> u64 {
        if retry == 0 {
            return 0;
        }

        let nominal = self.base_delay_ms.saturating_mul(retry as u64);
        let spread = nominal / 10;
        let jittered = if spread == 0 {
            nominal
        } else {
            let offset = rand::thread_rng().gen_range(0..=spread * 2);
            nominal.saturating_add(offset).saturating_sub(spread)
        };

        jittered.min(self.max_delay_ms)
    }

    /// Wait before the next attempt, honouring a server-supplied `Retry-After`
    fn delay_before_retry_ms(&self, retry: u32, retry_after_secs: Option<u64>) -> u64 {
        match retry_after_secs {
            Some(seconds) => seconds.saturating_mul(1000).min(self.max_delay_ms),
            None => self.backoff_delay_ms(retry),
        }
    }
}

/// A failure worth another attempt
#[derive(Debug)]
enum Transient {
    RateLimited { retry_after: Option<u64> },
    Server { status: StatusCode, body: String },
    TimedOut,
    Network(String),
}

impl Transient {
    fn retry_after(&self) -> Option<u64> {
        match self {
            Transient::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Error reported once no attempts are left
    fn into_error(self, provider_name: &str, attempts: u32, timeout_secs: u64) -> LlmError {
        match self {
            Transient::RateLimited { retry_after } => LlmError::RateLimitError { retry_after },
            Transient::Server { status, body } => LlmError::ApiError(format!(
                "Max retries reached. {} server error {}: {}",
                provider_name, status, body
            )),
            Transient::TimedOut => LlmError::ApiError(format!(
                "{} request timed out after {} seconds ({} attempts)",
                provider_name, timeout_secs, attempts
            )),
            Transient::Network(reason) => LlmError::ApiError(format!(
                "Max retries reached. Network error: {}",
                reason
            )),
        }
    }
}

enum Attempt {
    Body(String),
    Failed(LlmError),
    Retry(Transient),
}

async fn attempt_once(
    request: reqwest::RequestBuilder,
    timeout: Duration,
    provider_name: &str,
) -> Attempt {
    let response = match request.timeout(timeout).send().await {
        Ok(response) => response,
        Err(err) if err.is_timeout() => return Attempt::Retry(Transient::TimedOut),
        // The request URL carries the API key, keep it out of messages
        Err(err) => return Attempt::Retry(Transient::Network(err.without_url().to_string())),
    };

    let status = response.status();
    debug!("{} API response status: {}", provider_name, status);

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        return Attempt::Retry(Transient::RateLimited { retry_after });
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) if status.is_success() => {
            return Attempt::Failed(LlmError::ApiError(format!(
                "Failed to read {} response body: {}",
                provider_name,
                e.without_url()
            )))
        }
        Err(_) => "<unreadable body>".to_string(),
    };

    if status.is_success() {
        Attempt::Body(body)
    } else if status.is_server_error() {
        Attempt::Retry(Transient::Server { status, body })
    } else {
        Attempt::Failed(LlmError::ApiError(format!(
            "{} HTTP error {}: {}",
            provider_name, status, body
        )))
    }
}

/// Send a JSON request, retrying transient failures
///
/// `prepare_request` is called once per attempt since a `RequestBuilder`
/// cannot be reused after sending.
pub async fn send_api_request_with_retry<T, F>(
    prepare_request: F,
    config: &RetryConfig,
    provider_name: &str,
) -> Result<T, LlmError>
where
    T: serde::de::DeserializeOwned,
    F: Fn() -> reqwest::RequestBuilder,
{
    let timeout = Duration::from_secs(config.timeout_secs);
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    let body = loop {
        let failure = match attempt_once(prepare_request(), timeout, provider_name).await {
            Attempt::Body(body) => break body,
            Attempt::Failed(err) => return Err(err),
            Attempt::Retry(failure) => failure,
        };

        if attempt >= max_attempts {
            error!(
                "{} API call failed after {} attempts: {:?}",
                provider_name, attempt, failure
            );
            return Err(failure.into_error(provider_name, attempt, config.timeout_secs));
        }

        let delay_ms = config.delay_before_retry_ms(attempt, failure.retry_after());
        warn!(
            "{} API call failed ({:?}), retrying in {} ms (attempt {}/{})",
            provider_name,
            failure,
            delay_ms,
            attempt + 1,
            max_attempts
        );
        sleep(Duration::from_millis(delay_ms)).await;
        attempt += 1;
    };

    serde_json::from_str::<T>(&body).map_err(|e| {
        error!(
            "Failed to parse {} response. Error: {}. Body:\n{}",
            provider_name, e, body
        );
        LlmError::ApiError(format!("Failed to parse {} response: {}", provider_name, e))
    })
}
