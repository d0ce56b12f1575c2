//! Changelog generation
//!
//! Runs the deterministic stages in order: filter, parse, detect, assemble.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use shiplog_core::config::Config;
use shiplog_core::{Result, RunContext, Stage};
use shiplog_git::CommitInfo;

use crate::assembler::ChangelogAssembler;
use crate::breaking::BreakingDetector;
use crate::parser::{CommitParser, ConventionalParser};
use crate::types::{ChangelogDocument, CommitRecord};

/// Changelog generator
pub struct ChangelogGenerator {
    parser: Box<dyn CommitParser>,
    detector: BreakingDetector,
    assembler: ChangelogAssembler,
}

impl ChangelogGenerator {
    /// Create a generator with the conventional parser
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            parser: Box::new(ConventionalParser::new(config.changelog.clone())?),
            detector: BreakingDetector::new(&config.breaking)?,
            assembler: ChangelogAssembler::new(config.changelog.clone()),
        })
    }

    /// The detector, for callers that read commits themselves
    pub fn detector(&self) -> &BreakingDetector {
        &self.detector
    }

    /// Parse and evaluate every included commit
    #[instrument(parent = ctx.span(), skip_all, fields(commit_count = commits.len()))]
    pub fn classify(&self, commits: &[CommitInfo], ctx: &RunContext) -> Vec<CommitRecord> {
        let included: Vec<&CommitInfo> = commits
            .iter()
            .filter(|c| self.parser.should_include(c))
            .collect();

        let dropped = commits.len() - included.len();
        if dropped > 0 {
            ctx.record(
                Stage::Parsing,
                None,
                format!("{} commit(s) matched ignore patterns and were dropped", dropped),
            );
        }

        let records: Vec<CommitRecord> = included
            .into_iter()
            .map(|c| self.parser.parse(c, ctx))
            .map(|r| self.detector.detect(r, ctx))
            .collect();

        debug!(
            records = records.len(),
            breaking = records.iter().filter(|r| r.is_breaking).count(),
            "commits classified"
        );
        records
    }

    /// Classify and assemble in one step
    #[instrument(parent = ctx.span(), skip_all, fields(range = %range, commit_count = commits.len()))]
    pub fn generate(
        &self,
        commits: &[CommitInfo],
        range: &str,
        generated_at: DateTime<Utc>,
        ctx: &RunContext,
    ) -> ChangelogDocument {
        info!(range, commit_count = commits.len(), "generating changelog");
        let records = self.classify(commits, ctx);
        self.assembler.assemble(&records, range, generated_at, ctx)
    }
}
