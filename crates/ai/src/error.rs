//! Report generation error types.

use advisor_core::resolver::ExhaustedError;
use thiserror::Error;

/// Report generation errors.
#[derive(Debug, Error)]
pub enum AiError {
    /// Missing API key for a provider.
    #[error("Missing API key for provider {0}")]
    MissingApiKey(String),

    /// Provider-side failure (API error, refusal, empty completion).
    #[error("Provider error: {0}")]
    Provider(String),

    /// Transport failure talking to a provider.
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed provider response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Every configured provider failed (or none is configured).
    #[error("All LLM providers exhausted: {0}")]
    Exhausted(#[from] ExhaustedError),
}

impl AiError {
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
