//! Relay backend
//!
//! Speaks to an OpenAI-compatible HTTP relay. The relay either unwraps the
//! provider response to `{"text": ...}` or forwards the raw chat-completions
//! shape; both are accepted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::prompt::Message;
use crate::LlmError;

/// Relay connection configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Relay endpoint URL
    pub endpoint: String,
    /// Model identifier forwarded to the provider
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Request timeout
    pub timeout: Duration,
    /// Retries after the first attempt, transient errors only
    pub max_retries: u32,
    /// Initial backoff, doubled per retry
    pub initial_backoff: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8787/chat".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 300,
            timeout: Duration::from_secs(30),
            max_retries: 2,
            initial_backoff: Duration::from_millis(250),
        }
    }
}

/// The LLM call boundary the engine depends on.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate one completion for an ordered message array.
    async fn generate(&self, messages: &[Message]) -> Result<String, LlmError>;

    fn model_name(&self) -> &str;
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct RelayResponse {
    text: Option<String>,
    #[serde(default)]
    choices: Vec<RelayChoice>,
}

#[derive(Deserialize)]
struct RelayChoice {
    message: RelayChoiceMessage,
}

#[derive(Deserialize)]
struct RelayChoiceMessage {
    content: String,
}

impl RelayResponse {
    fn into_text(self) -> Result<String, LlmError> {
        if let Some(text) = self.text {
            return Ok(text);
        }
        self.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                LlmError::InvalidResponse("no text or choices in relay response".to_string())
            })
    }
}

/// HTTP relay backend with bounded retry.
#[derive(Clone)]
pub struct RelayBackend {
    client: Client,
    config: RelayConfig,
}

impl RelayBackend {
    pub fn new(config: RelayConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                LlmError::Configuration(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    async fn execute_request(&self, messages: &[Message]) -> Result<String, LlmError> {
        let request = RelayRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            messages,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            // 5xx are retryable, 4xx are not
            if status.is_server_error() {
                return Err(LlmError::Network(format!("server error {status}: {body}")));
            }
            return Err(LlmError::Api(format!("{status}: {body}")));
        }

        let parsed: RelayResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        parsed.into_text()
    }

    fn is_retryable(error: &LlmError) -> bool {
        matches!(error, LlmError::Network(_) | LlmError::Timeout)
    }
}

#[async_trait]
impl LlmBackend for RelayBackend {
    async fn generate(&self, messages: &[Message]) -> Result<String, LlmError> {
        let mut last_error = None;
        let mut backoff = self.config.initial_backoff;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::warn!(
                    ?backoff,
                    attempt,
                    max = self.config.max_retries,
                    "relay request failed, retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.execute_request(messages).await {
                Ok(text) => return Ok(text),
                Err(e) if Self::is_retryable(&e) => {
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Network("max retries exceeded".to_string())))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrapped_relay_shape() {
        let raw = r#"{"text": "hello there"}"#;
        let parsed: RelayResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.into_text().unwrap(), "hello there");
    }

    #[test]
    fn test_openai_passthrough_shape() {
        let raw = r#"{"choices": [{"message": {"role": "assistant", "content": "hi"}}]}"#;
        let parsed: RelayResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.into_text().unwrap(), "hi");
    }

    #[test]
    fn test_empty_response_is_error() {
        let parsed: RelayResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.into_text().is_err());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(RelayBackend::is_retryable(&LlmError::Timeout));
        assert!(RelayBackend::is_retryable(&LlmError::Network("x".into())));
        assert!(!RelayBackend::is_retryable(&LlmError::Api("400".into())));
    }
}
