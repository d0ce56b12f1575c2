//! xAI chat completions (OpenAI-compatible)

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use shiplog_core::config::{AiConfig, ProviderKind};

use super::{base_url, check_reachable, require_api_key, send_json};
use crate::error::ProviderError;
use crate::payload::{GenerationOutput, GenerationRequest};
use crate::provider::TextGenerator;

const DEFAULT_API_URL: &str = "https://api.x.ai/v1";

/// xAI backend
pub struct XaiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl XaiProvider {
    /// Create a provider; fails without an API key
    pub fn new(config: &AiConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: Client::new(),
            base_url: base_url(config, DEFAULT_API_URL),
            api_key: require_api_key(config, ProviderKind::Xai)?,
            model: config.model_name()?,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl TextGenerator for XaiProvider {
    fn name(&self) -> &str {
        "xai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request), fields(model = %self.model, kind = request.kind()))]
    async fn invoke(&self, request: &GenerationRequest) -> Result<GenerationOutput, ProviderError> {
        let body = json!({
            "model": self.model,
            "stream": false,
            "max_tokens": self.max_tokens,
            "messages": [
                { "role": "system", "content": request.system_prompt() },
                { "role": "user", "content": request.user_prompt() },
            ],
        });

        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, "sending xai completion request");
        let response: CompletionResponse = send_json(
            self.client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body),
        )
        .await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse("completion has no choices".to_string()))?;
        request.interpret(&content)
    }

    async fn check_connectivity(&self) -> bool {
        let url = format!("{}/models", self.base_url);
        check_reachable(self.client.get(&url).bearer_auth(&self.api_key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_authentication_error() {
        let config = AiConfig {
            provider: "xai".to_string(),
            api_key: None,
            ..AiConfig::default()
        };
        // only meaningful when the environment does not provide a key
        if std::env::var("XAI_API_KEY").is_err() {
            assert!(matches!(
                XaiProvider::new(&config),
                Err(ProviderError::Authentication(_))
            ));
        }
    }

    #[test]
    fn test_completion_decode() {
        let response: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"Done."}}]}"#,
        )
        .unwrap();
        assert_eq!(response.choices[0].message.content.as_deref(), Some("Done."));
    }
}
