//! Backend implementations

mod anthropic;
mod ollama;
mod xai;

pub use anthropic::AnthropicProvider;
pub use ollama::OllamaProvider;
pub use xai::XaiProvider;

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::debug;

use shiplog_core::config::{AiConfig, ProviderKind};

use crate::error::ProviderError;

/// Bound on connectivity checks
pub(crate) const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Send a request and decode a JSON reply, mapping HTTP failures
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ProviderError> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        let message = response.text().await.unwrap_or_default();
        return Err(ProviderError::from_status(status.as_u16(), message, retry_after));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

/// Whether a check request answers with a success status
pub(crate) async fn check_reachable(request: RequestBuilder) -> bool {
    match request.timeout(PROBE_TIMEOUT).send().await {
        Ok(response) => {
            debug!(status = response.status().as_u16(), "connectivity check answered");
            response.status().is_success()
        }
        Err(e) => {
            debug!(error = %e, "connectivity check failed");
            false
        }
    }
}

/// Configured key, else the provider's environment variable
pub fn resolve_api_key(config: &AiConfig, kind: ProviderKind) -> Option<String> {
    config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or_else(|| {
            kind.api_key_env()
                .and_then(|var| std::env::var(var).ok())
                .filter(|k| !k.trim().is_empty())
        })
}

pub(crate) fn require_api_key(config: &AiConfig, kind: ProviderKind) -> Result<String, ProviderError> {
    resolve_api_key(config, kind).ok_or_else(|| {
        ProviderError::Authentication(format!(
            "no API key for {} (set ai.api_key or {})",
            kind,
            kind.api_key_env().unwrap_or("an API key")
        ))
    })
}

/// Base URL from config, else the default, without a trailing slash
pub(crate) fn base_url(config: &AiConfig, default: &str) -> String {
    config
        .base_url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or(default)
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_key_wins() {
        let config = AiConfig {
            api_key: Some("  sk-test  ".to_string()),
            ..AiConfig::default()
        };
        assert_eq!(
            resolve_api_key(&config, ProviderKind::Anthropic).as_deref(),
            Some("sk-test")
        );
    }

    #[test]
    fn test_ollama_needs_no_key() {
        assert!(resolve_api_key(&AiConfig::default(), ProviderKind::Ollama).is_none());
    }

    #[test]
    fn test_base_url_override() {
        let config = AiConfig {
            base_url: Some("http://gpu-box:11434/".to_string()),
            ..AiConfig::default()
        };
        assert_eq!(base_url(&config, "http://localhost:11434"), "http://gpu-box:11434");
        assert_eq!(
            base_url(&AiConfig::default(), "http://localhost:11434"),
            "http://localhost:11434"
        );
    }
}
