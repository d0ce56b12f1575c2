//! Shiplog Core - shared foundations for changelog generation
//!
//! This crate provides the error taxonomy, the typed configuration and the
//! per-run context that every pipeline stage receives.

pub mod config;
pub mod context;
pub mod error;

pub use config::Config;
pub use context::{Diagnostic, RunContext};
pub use error::{ConfigError, GitError, Result, ShiplogError, Stage, StageError};
