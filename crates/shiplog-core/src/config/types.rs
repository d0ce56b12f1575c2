//! Configuration types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Main configuration for shiplog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Version of the config schema
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Section layout and commit classification
    pub changelog: ChangelogConfig,

    /// Breaking-change detection
    pub breaking: BreakingConfig,

    /// Text-generation enhancement
    pub ai: AiConfig,

    /// Output rendering
    pub render: RenderConfig,

    /// Run policy
    pub generate: GenerateConfig,
}

/// One row of the ordered type table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Canonical type tag (e.g. "feat")
    #[serde(rename = "type")]
    pub commit_type: String,

    /// Section heading
    pub title: String,

    /// Alternative spellings mapped onto this tag
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    /// Assemble but do not render unless `render.show_hidden` is set
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl SectionConfig {
    /// Create a visible section row
    pub fn new(commit_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            commit_type: commit_type.into(),
            title: title.into(),
            aliases: Vec::new(),
            hidden: false,
        }
    }

    /// Add an alias
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Mark the section hidden
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Whether a lowercase raw type maps onto this row
    pub fn matches(&self, raw_type: &str) -> bool {
        self.commit_type.eq_ignore_ascii_case(raw_type)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(raw_type))
    }
}

/// Changelog classification configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Ordered type table; order here is section order in the output
    pub sections: Vec<SectionConfig>,

    /// Type tag given to messages that are not conventional commits
    pub fallback_type: String,

    /// Title of the implicit section for unconfigured tags
    pub fallback_title: String,

    /// Regexes; matching subjects are dropped before parsing
    pub ignore_patterns: Vec<String>,
}

impl ChangelogConfig {
    /// Resolve a raw header type to its canonical tag, if configured
    pub fn canonical_type(&self, raw_type: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.matches(raw_type))
            .map(|s| s.commit_type.as_str())
    }
}

/// Breaking-change detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakingConfig {
    /// Phrases searched in commit bodies (case-insensitive)
    pub keywords: Vec<String>,

    /// Globs identifying public interface files
    pub public_interface_globs: Vec<String>,

    /// Version manifest file names or globs
    pub version_files: Vec<String>,

    /// Footer tokens that mark a commit as explicitly not breaking
    pub non_breaking_tokens: Vec<String>,
}

/// Text-generation backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Local Ollama server
    Ollama,
    /// Anthropic Messages API
    Anthropic,
    /// xAI chat completions API
    Xai,
}

impl ProviderKind {
    /// All supported providers
    pub const ALL: [ProviderKind; 3] = [Self::Ollama, Self::Anthropic, Self::Xai];

    /// Environment variable holding the API key, if the backend needs one
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::Ollama => None,
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Xai => Some("XAI_API_KEY"),
        }
    }

    /// Model used when none is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Ollama => "qwen2.5:14b",
            Self::Anthropic => "claude-3-5-sonnet-latest",
            Self::Xai => "grok-2",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ollama => "ollama",
            Self::Anthropic => "anthropic",
            Self::Xai => "xai",
        };
        f.write_str(name)
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "xai" | "grok" => Ok(Self::Xai),
            other => Err(ConfigError::invalid(
                "ai.provider",
                format!("unsupported provider '{}' (use ollama, anthropic or xai)", other),
            )),
        }
    }
}

/// Text-generation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Whether to call a backend at all
    pub enabled: bool,

    /// Fail the run when enhancement fails
    pub required: bool,

    /// Backend name
    pub provider: String,

    /// Model name; empty means the provider default
    pub model: String,

    /// Override of the backend base URL
    pub base_url: Option<String>,

    /// API key; falls back to the provider's environment variable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,

    /// Attempt ceiling, including the first call
    pub max_attempts: u32,

    /// First backoff delay in milliseconds
    pub base_delay_ms: u64,

    /// Backoff cap in milliseconds
    pub max_delay_ms: u64,

    /// Sample commit descriptions sent per section
    pub max_samples: usize,

    /// Also ask the backend to corroborate the breaking-change list
    pub review_breaking: bool,
}

impl AiConfig {
    /// Parsed provider kind
    pub fn provider_kind(&self) -> Result<ProviderKind, ConfigError> {
        self.provider.parse()
    }

    /// Configured model or the provider default
    pub fn model_name(&self) -> Result<String, ConfigError> {
        if self.model.trim().is_empty() {
            Ok(self.provider_kind()?.default_model().to_string())
        } else {
            Ok(self.model.clone())
        }
    }
}

/// Output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown document
    Markdown,
    /// Self-contained HTML page
    Html,
    /// JSON document model
    Json,
}

impl OutputFormat {
    /// All formats
    pub const ALL: [OutputFormat; 3] = [Self::Markdown, Self::Html, Self::Json];

    /// Infer a format from an output file name; unknown extensions are markdown
    pub fn from_path(path: &std::path::Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("html") | Some("htm") => Self::Html,
            Some("json") => Self::Json,
            _ => Self::Markdown,
        }
    }

    /// File extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Html => "html",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "html" | "htm" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output format name
    pub format: String,

    /// Document title
    pub title: String,

    /// Whether to include short commit hashes
    pub include_hashes: bool,

    /// Whether to include authors
    pub include_authors: bool,

    /// Render sections marked hidden
    pub show_hidden: bool,

    /// Repository URL used to link commits
    pub repo_url: Option<String>,
}

impl RenderConfig {
    /// Parsed output format
    pub fn output_format(&self) -> Result<OutputFormat, ConfigError> {
        self.format.parse()
    }
}

/// Run policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Treat an empty commit range as an error
    pub require_commits: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("markdown".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("MD".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!(matches!(
            "pdf".parse::<OutputFormat>(),
            Err(ConfigError::UnknownFormat(f)) if f == "pdf"
        ));
    }

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("CHANGELOG.md")), OutputFormat::Markdown);
        assert_eq!(OutputFormat::from_path(Path::new("out/notes.HTML")), OutputFormat::Html);
        assert_eq!(OutputFormat::from_path(Path::new("notes.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("notes.txt")), OutputFormat::Markdown);
    }

    #[test]
    fn test_provider_kind() {
        assert_eq!("Ollama".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
        assert_eq!("grok".parse::<ProviderKind>().unwrap(), ProviderKind::Xai);
        assert!("openai".parse::<ProviderKind>().is_err());
        assert_eq!(ProviderKind::Anthropic.api_key_env(), Some("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_canonical_type_uses_aliases() {
        let config = ChangelogConfig::default();
        assert_eq!(config.canonical_type("feature"), Some("feat"));
        assert_eq!(config.canonical_type("FIX"), Some("fix"));
        assert_eq!(config.canonical_type("wip"), None);
    }

    #[test]
    fn test_model_name_falls_back_to_provider_default() {
        let ai = AiConfig {
            provider: "xai".into(),
            model: String::new(),
            ..AiConfig::default()
        };
        assert_eq!(ai.model_name().unwrap(), "grok-2");
    }
}
