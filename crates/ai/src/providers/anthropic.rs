use advisor_core::resolver::ProviderHandle;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::AiError;
use crate::providers::{GenerationRequest, LlmProvider};

const MODEL: &str = "claude-3-5-sonnet-20241022";
const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Anthropic backend via the messages API.
pub struct AnthropicProvider {
    client: Client,
    api_key: Option<String>,
}

impl AnthropicProvider {
    pub fn new(api_key: Option<String>) -> Self {
        AnthropicProvider {
            client: Client::new(),
            api_key,
        }
    }
}

impl ProviderHandle for AnthropicProvider {
    fn name(&self) -> &str {
        "ANTHROPIC"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AiError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AiError::MissingApiKey(self.name().to_string()))?;

        let body = MessagesRequest {
            model: MODEL.to_string(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system_prompt.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: request.user_prompt.clone(),
            }],
        };

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AiError::provider(format!(
                "Anthropic API error ({}): {}",
                status, error_body
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AiError::parse(e.to_string()))?;

        parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| AiError::provider("Anthropic returned no text content"))
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_puts_system_prompt_at_top_level() {
        let body = MessagesRequest {
            model: MODEL.to_string(),
            max_tokens: 3000,
            temperature: 0.5,
            system: "be terse".to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: "hello".to_string(),
            }],
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "claude-3-5-sonnet-20241022");
        assert_eq!(json["system"], "be terse");
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn parses_first_text_block() {
        let body = r##"{
            "id": "msg_1",
            "content": [{"type": "text", "text": "# Report"}],
            "model": "claude-3-5-sonnet-20241022",
            "stop_reason": "end_turn"
        }"##;
        let parsed: MessagesResponse = serde_json::from_str(body).unwrap();
        let text = parsed.content.into_iter().find_map(|b| b.text).unwrap();
        assert_eq!(text, "# Report");
    }
}
