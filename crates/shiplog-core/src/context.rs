//! Per-run context threaded through the pipeline stages
//!
//! Every stage entry point receives a [`RunContext`]. It owns the tracing
//! span for the run and collects non-fatal recoveries as [`Diagnostic`]s, so
//! callers and tests can inspect what was degraded without installing a
//! global subscriber.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, Span};

use crate::error::Stage;

/// A non-fatal event recorded during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stage that recorded the event
    pub stage: Stage,
    /// Commit id the event concerns, if any
    pub commit: Option<String>,
    /// Human-readable message
    pub message: String,
}

/// Context for a single changelog run
#[derive(Debug)]
pub struct RunContext {
    span: Span,
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl RunContext {
    /// Create a context for the given commit range
    pub fn new(range: &str) -> Self {
        Self {
            span: info_span!("shiplog_run", range = %range),
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    /// Context without a meaningful range, for tests and ad-hoc calls
    pub fn detached() -> Self {
        Self::new("-")
    }

    /// The run span; stages enter it while working
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Record a diagnostic; the CLI prints collected diagnostics itself
    pub fn record(&self, stage: Stage, commit: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        self.span.in_scope(|| {
            debug!(%stage, commit = commit.unwrap_or("-"), "{}", message);
        });
        let diagnostic = Diagnostic {
            stage,
            commit: commit.map(str::to_string),
            message,
        };
        match self.diagnostics.lock() {
            Ok(mut list) => list.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }

    /// Snapshot of all diagnostics recorded so far
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self.diagnostics.lock() {
            Ok(list) => list.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Diagnostics recorded by one stage
    pub fn diagnostics_for(&self, stage: Stage) -> Vec<Diagnostic> {
        self.diagnostics()
            .into_iter()
            .filter(|d| d.stage == stage)
            .collect()
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::detached()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_filter() {
        let ctx = RunContext::new("a..b");
        ctx.record(Stage::Parsing, Some("abc1234"), "not conventional");
        ctx.record(Stage::Enhancement, None, "provider unreachable");

        assert_eq!(ctx.diagnostics().len(), 2);
        let parsing = ctx.diagnostics_for(Stage::Parsing);
        assert_eq!(parsing.len(), 1);
        assert_eq!(parsing[0].commit.as_deref(), Some("abc1234"));
    }

    #[test]
    fn test_contexts_are_isolated() {
        let a = RunContext::detached();
        let b = RunContext::detached();
        a.record(Stage::Detection, None, "x");
        assert!(b.diagnostics().is_empty());
    }
}
