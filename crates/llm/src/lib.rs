//! Text-generation provider abstraction.
//!
//! The pipeline only needs a single-turn completion: one rendered prompt
//! in, free text out. [`TextGenerator`] is that seam;
//! [`ChatCompletionsProvider`] implements it for OpenAI-compatible
//! chat-completions endpoints.

use async_trait::async_trait;

pub mod chat;

pub use chat::{ChatCompletionsProvider, ProviderConfig};

/// Errors from a provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS).
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Provider returned no content")]
    EmptyResponse,

    #[error("Provider request timed out")]
    Timeout,

    #[error("Could not decode provider response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Request(err)
        }
    }
}

/// One completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    /// Token ceiling for the reply.
    pub max_tokens: u32,
    /// Sampling temperature, `0.0..=2.0`.
    pub temperature: f32,
}

/// A provider that turns a prompt into free text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}
