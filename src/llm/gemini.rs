//! Google Gemini API integration
//!
//! Sends a single-turn `generateContent` request carrying the whole prompt
//! and extracts the text of the first candidate.

use crate::llm::retry_utils::{send_api_request_with_retry, RetryConfig};
use crate::llm::{Backend, LlmError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Public Gemini REST endpoint
pub const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;

/// Gemini API request types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

/// Pull the reply text out of a raw `generateContent` response
///
/// The parts of the first candidate are concatenated. A blocked prompt is an
/// error; anything else without extractable text falls back to the JSON
/// rendering of the raw response.
pub fn extract_response_text(raw: &Value) -> Result<String, LlmError> {
    let parsed = match serde_json::from_value::<GeminiResponse>(raw.clone()) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Unexpected Gemini response shape: {}", e);
            return Ok(raw.to_string());
        }
    };

    if let Some(reason) = parsed
        .prompt_feedback
        .as_ref()
        .and_then(|fb| fb.block_reason.as_deref())
    {
        return Err(LlmError::Blocked(reason.to_string()));
    }

    if let Some(usage) = &parsed.usage_metadata {
        debug!(
            prompt_tokens = usage.prompt_token_count.unwrap_or(0),
            output_tokens = usage.candidates_token_count.unwrap_or(0),
            "Gemini token usage"
        );
    }

    let text: String = parsed
        .candidates
        .first()
        .and_then(|candidate| {
            debug!(
                "Gemini finish reason: {}",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            );
            candidate.content.as_ref()
        })
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        warn!("Gemini response carried no text, falling back to the raw response");
        return Ok(raw.to_string());
    }

    Ok(text)
}

/// Google Gemini API client implementation
pub struct GeminiBackend {
    api_key: String,
    client: reqwest::Client,
    model_name: String,
    base_url: String,
    retry: RetryConfig,
}

impl GeminiBackend {
    /// Create a new Gemini client
    pub fn new(api_key: String, model_name: String) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LlmError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            client,
            model_name,
            base_url: API_BASE_URL.to_string(),
            retry: RetryConfig::default(),
        })
    }

    /// Point the client at a different API root (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model_name)
    }

    fn build_request(prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
                role: Some("user".to_string()),
            }],
            generation_config: Some(GeminiGenerationConfig {
                max_output_tokens: Some(DEFAULT_MAX_OUTPUT_TOKENS),
                temperature: None,
            }),
        }
    }
}

#[async_trait]
impl Backend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request = Self::build_request(prompt);
        let url = self.endpoint();
        debug!(
            model = %self.model_name,
            prompt_chars = prompt.chars().count(),
            "sending Gemini generateContent request"
        );

        let prepare_request = || {
            self.client
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&request)
        };

        let raw: Value = send_api_request_with_retry(prepare_request, &self.retry, "Gemini").await?;
        extract_response_text(&raw)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn quick_retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 2,
            base_delay_ms: 0,
            max_delay_ms: 0,
            timeout_secs: 5,
        }
    }

    fn backend(base_url: &str) -> GeminiBackend {
        GeminiBackend::new("test-key".to_string(), "gemini-1.5-pro".to_string())
            .unwrap()
            .with_base_url(base_url)
            .with_retry_config(quick_retry())
    }

    #[test]
    fn test_extract_concatenates_parts() {
        let raw = json!({
            "candidates": [{
                "content": {"parts": [{"text": "Day 1: "}, {"text": "Eiffel Tower"}], "role": "model"},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 4}
        });
        assert_eq!(extract_response_text(&raw).unwrap(), "Day 1: Eiffel Tower");
    }

    #[test]
    fn test_extract_reports_blocked_prompt() {
        let raw = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        match extract_response_text(&raw) {
            Err(LlmError::Blocked(reason)) => assert_eq!(reason, "SAFETY"),
            other => panic!("expected blocked error, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_falls_back_to_raw_rendering() {
        let raw = json!({"candidates": [{"finishReason": "MAX_TOKENS"}]});
        assert_eq!(extract_response_text(&raw).unwrap(), raw.to_string());

        let odd = json!(["not", "an", "object"]);
        assert_eq!(extract_response_text(&odd).unwrap(), odd.to_string());
    }

    #[test]
    fn test_request_shape() {
        let request = serde_json::to_value(GeminiBackend::build_request("hello")).unwrap();
        assert_eq!(
            request,
            json!({
                "contents": [{"parts": [{"text": "hello"}], "role": "user"}],
                "generationConfig": {"maxOutputTokens": 8192}
            })
        );
    }

    #[tokio::test]
    async fn test_generate_sends_prompt_and_returns_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-1.5-pro:generateContent")
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::PartialJson(json!({
                "contents": [{"parts": [{"text": "Plan Paris"}]}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"candidates": [{"content": {"parts": [{"text": "Day 1: Louvre"}]}}]})
                    .to_string(),
            )
            .create_async()
            .await;

        let reply = backend(&server.url()).generate("Plan Paris").await.unwrap();

        assert_eq!(reply, "Day 1: Louvre");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_retries_server_errors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-1.5-pro:generateContent")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("overloaded")
            .expect(2)
            .create_async()
            .await;

        let err = backend(&server.url()).generate("hi").await.unwrap_err();

        assert!(err.to_string().contains("Max retries reached"));
        assert!(err.to_string().contains("overloaded"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_does_not_retry_client_errors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-1.5-pro:generateContent")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body("API key not valid")
            .expect(1)
            .create_async()
            .await;

        let err = backend(&server.url()).generate("hi").await.unwrap_err();

        assert!(matches!(err, LlmError::ApiError(ref msg) if msg.contains("API key not valid")));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_surfaces_rate_limit() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/gemini-1.5-pro:generateContent")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_header("retry-after", "0")
            .expect(2)
            .create_async()
            .await;

        let err = backend(&server.url()).generate("hi").await.unwrap_err();

        assert!(matches!(
            err,
            LlmError::RateLimitError {
                retry_after: Some(0)
            }
        ));
    }

    #[tokio::test]
    async fn test_generate_rejects_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/gemini-1.5-pro:generateContent")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let err = backend(&server.url()).generate("hi").await.unwrap_err();

        assert!(err.to_string().contains("Failed to parse Gemini response"));
    }

    #[test]
    fn test_backend_identity() {
        let backend = backend("http://localhost/");
        assert_eq!(backend.name(), "gemini");
        assert_eq!(backend.model(), "gemini-1.5-pro");
        assert_eq!(
            backend.endpoint(),
            "http://localhost/models/gemini-1.5-pro:generateContent"
        );
    }
}
