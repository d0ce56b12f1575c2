//! Shiplog Git - commit range access
//!
//! This crate opens a repository, resolves a commit range and turns every
//! commit in it into a [`CommitInfo`] carrying changed files, per-file line
//! counts and snapshots of requested files.

mod commits;
mod repository;
pub mod types;

pub use commits::CommitRange;
pub use repository::{GitRepo, Result};
pub use types::{CommitInfo, FileChange, FileSnapshot, FileStatus};
