//! Renderer registry

use std::sync::Arc;

use shiplog_core::config::{OutputFormat, RenderConfig};
use shiplog_core::ConfigError;

use super::{ChangelogRenderer, HtmlRenderer, JsonRenderer, MarkdownRenderer};

/// Registry of available changelog renderers
pub struct RendererRegistry {
    renderers: Vec<Arc<dyn ChangelogRenderer>>,
}

impl RendererRegistry {
    /// Create a registry with all built-in renderers
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            renderers: vec![
                Arc::new(MarkdownRenderer::new(config.clone())),
                Arc::new(HtmlRenderer::new(config.clone())),
                Arc::new(JsonRenderer::new()),
            ],
        }
    }

    /// Get renderer by format; a missing one is a configuration error
    pub fn get(&self, format: OutputFormat) -> Result<Arc<dyn ChangelogRenderer>, ConfigError> {
        self.renderers
            .iter()
            .find(|r| r.format() == format)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownFormat(format.to_string()))
    }

}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = RendererRegistry::default();
        for format in OutputFormat::ALL {
            assert_eq!(registry.get(format).unwrap().format(), format);
        }
        assert_eq!(registry.get(OutputFormat::Html).unwrap().extension(), "html");
    }

    #[test]
    fn test_missing_renderer_is_config_error() {
        let registry = RendererRegistry {
            renderers: vec![Arc::new(JsonRenderer::new())],
        };
        assert!(registry.get(OutputFormat::Json).is_ok());
        assert!(matches!(
            registry.get(OutputFormat::Markdown),
            Err(ConfigError::UnknownFormat(name)) if name == "markdown"
        ));
    }
}
