//! JSON changelog renderer

use shiplog_core::config::OutputFormat;
use shiplog_core::Result;
use tracing::{debug, instrument};

use super::ChangelogRenderer;
use crate::types::ChangelogDocument;

/// Emits the document model verbatim, fields in declaration order
#[derive(Debug, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Read a rendered document back
    pub fn parse(input: &str) -> Result<ChangelogDocument> {
        Ok(serde_json::from_str(input)?)
    }
}

impl ChangelogRenderer for JsonRenderer {
    #[instrument(skip(self, document), fields(range = %document.metadata.range))]
    fn render(&self, document: &ChangelogDocument) -> Result<String> {
        let mut output = serde_json::to_string_pretty(document)?;
        output.push('\n');
        debug!(output_len = output.len(), "json changelog rendered");
        Ok(output)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}
