//! Provider selection

use std::sync::Arc;

use tracing::info;

use shiplog_core::config::{AiConfig, ProviderKind};

use crate::error::ProviderError;
use crate::provider::TextGenerator;
use crate::providers::{AnthropicProvider, OllamaProvider, XaiProvider};

/// Build the configured backend
pub fn build_provider(config: &AiConfig) -> Result<Arc<dyn TextGenerator>, ProviderError> {
    let kind = config.provider_kind()?;
    let provider: Arc<dyn TextGenerator> = match kind {
        ProviderKind::Ollama => Arc::new(OllamaProvider::new(config)?),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(config)?),
        ProviderKind::Xai => Arc::new(XaiProvider::new(config)?),
    };
    info!(provider = provider.name(), model = provider.model(), "text generation provider selected");
    Ok(provider)
}
