//! LLM boundary for the coaching engine
//!
//! The engine talks to an OpenAI-compatible relay through the `LlmBackend`
//! trait. Failures never reach the user as errors; the composer substitutes
//! fallback text.

pub mod backend;
pub mod prompt;

pub use backend::{LlmBackend, RelayBackend, RelayConfig};
pub use prompt::{build_messages, estimate_tokens, Message, Role};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}
