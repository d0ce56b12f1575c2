//! Error types for shiplog

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using ShiplogError
pub type Result<T> = std::result::Result<T, ShiplogError>;

/// Main error type for shiplog operations
#[derive(Debug, Error)]
pub enum ShiplogError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// A pipeline stage failed
    #[error(transparent)]
    Stage(#[from] StageError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl ShiplogError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// The pipeline stage this error belongs to, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage(e) => Some(e.stage),
            _ => None,
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// Requested output format does not exist
    #[error("Unknown output format '{0}' (expected one of: markdown, html, json)")]
    UnknownFormat(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Shorthand for an invalid value error
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found
    #[error("Git repository not found at {0}")]
    RepositoryNotFound(PathBuf),

    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// A revision in the requested range does not resolve
    #[error("Invalid revision '{rev}': {reason}")]
    InvalidRevision { rev: String, reason: String },

    /// Malformed range expression
    #[error("Invalid commit range '{0}': expected <from>..<to>")]
    InvalidRange(String),

    /// No commits found
    #[error("No commits found in range {0}")]
    NoCommits(String),

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Pipeline stages, used to tag failures and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Commit message parsing
    Parsing,
    /// Breaking-change detection
    Detection,
    /// Section assembly
    Assembly,
    /// Text-generation enhancement
    Enhancement,
    /// Output rendering
    Rendering,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsing => "parsing",
            Self::Detection => "detection",
            Self::Assembly => "assembly",
            Self::Enhancement => "enhancement",
            Self::Rendering => "rendering",
        };
        f.write_str(name)
    }
}

/// A failure inside one pipeline stage
///
/// `context` identifies what was being processed: a commit id, a format
/// name, or a provider.
#[derive(Debug, Error)]
#[error("{stage} stage failed ({context}): {message}")]
pub struct StageError {
    pub stage: Stage,
    pub context: String,
    pub message: String,
}

impl StageError {
    /// Create a new stage error
    pub fn new(stage: Stage, context: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage,
            context: context.into(),
            message: message.into(),
        }
    }
}
