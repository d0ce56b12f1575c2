//! Local Ollama server

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

use shiplog_core::config::AiConfig;

use super::{base_url, send_json, PROBE_TIMEOUT};
use crate::error::ProviderError;
use crate::payload::{GenerationOutput, GenerationRequest};
use crate::provider::TextGenerator;

const DEFAULT_HOST: &str = "http://localhost:11434";

/// Ollama chat backend
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

impl OllamaProvider {
    /// Create a provider; the host comes from config, `OLLAMA_HOST` or the default
    pub fn new(config: &AiConfig) -> Result<Self, ProviderError> {
        let host = match std::env::var("OLLAMA_HOST") {
            Ok(host) if config.base_url.is_none() && !host.trim().is_empty() => {
                let host = host.trim();
                if host.starts_with("http://") || host.starts_with("https://") {
                    host.trim_end_matches('/').to_string()
                } else {
                    format!("http://{}", host.trim_end_matches('/'))
                }
            }
            _ => base_url(config, DEFAULT_HOST),
        };

        Ok(Self {
            client: Client::new(),
            base_url: host,
            model: config.model_name()?,
            max_tokens: config.max_tokens,
        })
    }

    /// Whether the tag list offers the configured model
    fn has_model(&self, tags: &TagsResponse) -> bool {
        tags.models.iter().any(|m| {
            m.name == self.model
                || (!self.model.contains(':') && m.name.starts_with(&format!("{}:", self.model)))
        })
    }
}

#[async_trait]
impl TextGenerator for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request), fields(model = %self.model, kind = request.kind()))]
    async fn invoke(&self, request: &GenerationRequest) -> Result<GenerationOutput, ProviderError> {
        let body = json!({
            "model": self.model,
            "stream": false,
            "messages": [
                { "role": "system", "content": request.system_prompt() },
                { "role": "user", "content": request.user_prompt() },
            ],
            "options": { "num_predict": self.max_tokens },
        });

        let url = format!("{}/api/chat", self.base_url);
        debug!(url = %url, "sending ollama chat request");
        let response: ChatResponse = send_json(self.client.post(&url).json(&body)).await?;
        request.interpret(&response.message.content)
    }

    async fn check_connectivity(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match send_json::<TagsResponse>(self.client.get(&url).timeout(PROBE_TIMEOUT)).await {
            Ok(tags) if self.has_model(&tags) => true,
            Ok(_) => {
                warn!(model = %self.model, "model not available on ollama server (try `ollama pull`)");
                false
            }
            Err(e) => {
                debug!(error = %e, "could not list ollama models");
                false
            }
        }
    }
}
