//! Anthropic Messages API

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use shiplog_core::config::{AiConfig, ProviderKind};

use super::{base_url, check_reachable, require_api_key, send_json};
use crate::error::ProviderError;
use crate::payload::{GenerationOutput, GenerationRequest};
use crate::provider::TextGenerator;

const DEFAULT_API_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Anthropic backend
pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl AnthropicProvider {
    /// Create a provider; fails without an API key
    pub fn new(config: &AiConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: Client::new(),
            base_url: base_url(config, DEFAULT_API_URL),
            api_key: require_api_key(config, ProviderKind::Anthropic)?,
            model: config.model_name()?,
            max_tokens: config.max_tokens,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
    }
}

#[async_trait]
impl TextGenerator for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request), fields(model = %self.model, kind = request.kind()))]
    async fn invoke(&self, request: &GenerationRequest) -> Result<GenerationOutput, ProviderError> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": request.system_prompt(),
            "messages": [
                { "role": "user", "content": request.user_prompt() },
            ],
        });

        let url = format!("{}/v1/messages", self.base_url);
        debug!(url = %url, "sending anthropic messages request");
        let response: MessagesResponse =
            send_json(self.authorized(self.client.post(&url)).json(&body)).await?;

        let text: String = response
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("");
        request.interpret(&text)
    }

    async fn check_connectivity(&self) -> bool {
        let url = format!("{}/v1/models", self.base_url);
        check_reachable(self.authorized(self.client.get(&url))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let config = AiConfig {
            provider: "anthropic".to_string(),
            model: String::new(),
            api_key: Some("sk-test".to_string()),
            ..AiConfig::default()
        };
        let provider = AnthropicProvider::new(&config).unwrap();
        assert_eq!(provider.model(), "claude-3-5-sonnet-latest");
        assert_eq!(provider.base_url, "https://api.anthropic.com");
    }

    #[test]
    fn test_content_blocks_decode() {
        let response: MessagesResponse = serde_json::from_str(
            r#"{"id":"m","content":[{"type":"text","text":"Hello"},{"type":"text","text":" there"}]}"#,
        )
        .unwrap();
        assert_eq!(response.content.len(), 2);
        assert_eq!(response.content[1].text, " there");
    }
}
