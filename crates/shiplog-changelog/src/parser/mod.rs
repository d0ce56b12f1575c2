//! Commit parsing

mod conventional;

pub use conventional::ConventionalParser;

use shiplog_core::RunContext;
use shiplog_git::CommitInfo;

use crate::types::CommitRecord;

/// Trait for commit parsers
pub trait CommitParser: Send + Sync {
    /// Classify one commit; malformed messages degrade to the fallback tag
    fn parse(&self, commit: &CommitInfo, ctx: &RunContext) -> CommitRecord;

    /// Check if a commit should reach the changelog at all
    fn should_include(&self, commit: &CommitInfo) -> bool;
}
