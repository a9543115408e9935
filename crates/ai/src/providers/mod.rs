//! LLM provider clients and their fallback registry.
//!
//! Provider order is fixed: Gemini first (fast and cheap), then OpenAI, then
//! Anthropic. Providers without an API key are skipped without an attempt.

pub(crate) mod anthropic;
pub(crate) mod gemini;
pub(crate) mod openai;

use std::sync::Arc;

use advisor_core::resolver::{resolve, ProviderHandle, Resolved};
use async_trait::async_trait;
use futures::FutureExt;

use crate::error::AiError;
use anthropic::AnthropicProvider;
use gemini::GeminiProvider;
use openai::OpenAiProvider;

/// One completion request, shared across all providers.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// A chat completion backend.
#[async_trait]
pub trait LlmProvider: ProviderHandle {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AiError>;
}

/// API keys for the LLM backends. Any subset may be present.
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

/// Ordered LLM backends behind the fallback resolver.
pub struct LlmRegistry {
    providers: Vec<Arc<dyn LlmProvider>>,
}

impl LlmRegistry {
    pub fn new(config: LlmConfig) -> Self {
        LlmRegistry {
            providers: vec![
                Arc::new(GeminiProvider::new(config.gemini_api_key)),
                Arc::new(OpenAiProvider::new(config.openai_api_key)),
                Arc::new(AnthropicProvider::new(config.anthropic_api_key)),
            ],
        }
    }

    /// Names of the configured backends, in fallback order.
    pub fn active_providers(&self) -> Vec<String> {
        self.providers
            .iter()
            .filter(|p| p.is_configured())
            .map(|p| p.name().to_string())
            .collect()
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Resolved<String>, AiError> {
        resolve(&self.providers, |p| p.generate(request).boxed())
            .await
            .map_err(AiError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_order_is_gemini_openai_anthropic() {
        let registry = LlmRegistry::new(LlmConfig {
            gemini_api_key: Some("g".to_string()),
            openai_api_key: Some("o".to_string()),
            anthropic_api_key: Some("a".to_string()),
        });
        let names: Vec<&str> = registry.providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["GEMINI", "OPENAI", "ANTHROPIC"]);
    }

    #[test]
    fn only_keyed_backends_are_active() {
        let registry = LlmRegistry::new(LlmConfig {
            openai_api_key: Some("o".to_string()),
            ..Default::default()
        });
        assert_eq!(registry.active_providers(), vec!["OPENAI"]);

        let registry = LlmRegistry::new(LlmConfig::default());
        assert!(registry.active_providers().is_empty());
    }

    #[tokio::test]
    async fn no_keys_yields_empty_exhaustion() {
        let registry = LlmRegistry::new(LlmConfig::default());
        let request = GenerationRequest {
            system_prompt: "system".to_string(),
            user_prompt: "user".to_string(),
            temperature: 0.5,
            max_tokens: 100,
        };

        let err = registry.generate(&request).await.unwrap_err();
        match err {
            AiError::Exhausted(e) => assert!(e.attempts.is_empty()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
