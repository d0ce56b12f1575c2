//! Exit codes for the CLI

use shiplog_core::{ConfigError, GitError, ShiplogError, Stage};

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Git error, including an empty range when commits are required
pub const GIT_ERROR: i32 = 3;

/// Required text generation failed
pub const ENHANCEMENT_ERROR: i32 = 4;

/// Rendering failed
pub const RENDER_ERROR: i32 = 5;

/// Map an error chain to an exit code
pub fn for_error(error: &anyhow::Error) -> i32 {
    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<ShiplogError>() {
            return match e {
                ShiplogError::Config(_) => CONFIG_ERROR,
                ShiplogError::Git(_) => GIT_ERROR,
                ShiplogError::Stage(stage) => match stage.stage {
                    Stage::Enhancement => ENHANCEMENT_ERROR,
                    Stage::Rendering => RENDER_ERROR,
                    _ => ERROR,
                },
                _ => ERROR,
            };
        }
        if cause.is::<ConfigError>() {
            return CONFIG_ERROR;
        }
        if cause.is::<GitError>() {
            return GIT_ERROR;
        }
    }
    ERROR
}
