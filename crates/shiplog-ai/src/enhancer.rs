//! Optional narrative enhancement of an assembled document
//!
//! The enhancer never blocks a changelog from being produced. When it is
//! disabled, or the backend is unreachable or keeps failing, the document is
//! returned untouched and the [`EnhancementReport`] says what happened.
//! Only `ai.required` turns such a failure into an error.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use shiplog_changelog::{ChangelogDocument, NarrativeSummary};
use shiplog_core::config::AiConfig;
use shiplog_core::{Result, RunContext, Stage, StageError};

use crate::error::ProviderError;
use crate::factory::build_provider;
use crate::payload::{BreakingReview, GenerationOutput, GenerationPayload, GenerationRequest};
use crate::provider::TextGenerator;
use crate::retry::RetryPolicy;

/// Result of one backend call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum StepOutcome {
    /// Not requested
    Skipped,
    Succeeded,
    Failed(String),
}

impl StepOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// What the enhancer did during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnhancementReport {
    /// Backend name, when one was used
    pub provider: Option<String>,
    pub model: Option<String>,
    pub summary: StepOutcome,
    pub review: StepOutcome,
    /// Backend opinion on the breaking list; never merged into the document
    pub findings: Option<BreakingReview>,
}

impl EnhancementReport {
    /// Report for a run where nothing was attempted
    pub fn skipped() -> Self {
        Self {
            provider: None,
            model: None,
            summary: StepOutcome::Skipped,
            review: StepOutcome::Skipped,
            findings: None,
        }
    }

    /// Whether any requested call failed
    pub fn is_degraded(&self) -> bool {
        self.summary.is_failed() || self.review.is_failed()
    }
}

/// Calls a text-generation backend for a narrative summary and, optionally,
/// a review of the breaking list
pub struct Enhancer {
    generator: Option<Arc<dyn TextGenerator>>,
    policy: RetryPolicy,
    max_samples: usize,
    review_breaking: bool,
    required: bool,
}

impl Enhancer {
    /// Enhancer over an existing backend
    pub fn new(generator: Arc<dyn TextGenerator>, config: &AiConfig) -> Self {
        Self {
            generator: Some(generator),
            policy: RetryPolicy::from_config(config),
            max_samples: config.max_samples,
            review_breaking: config.review_breaking,
            required: config.required,
        }
    }

    /// Enhancer that leaves every document unchanged
    pub fn disabled() -> Self {
        Self {
            generator: None,
            policy: RetryPolicy::default(),
            max_samples: 0,
            review_breaking: false,
            required: false,
        }
    }

    /// Build from settings; a backend that cannot be constructed degrades
    /// to a disabled enhancer unless enhancement is required
    pub fn from_config(config: &AiConfig, ctx: &RunContext) -> Result<Self> {
        if !config.enabled {
            return Ok(Self::disabled());
        }
        match build_provider(config) {
            Ok(generator) => Ok(Self::new(generator, config)),
            Err(e) if config.required => {
                Err(StageError::new(Stage::Enhancement, "provider setup", e.to_string()).into())
            }
            Err(e) => {
                ctx.record(
                    Stage::Enhancement,
                    None,
                    format!("text generation disabled: {}", e),
                );
                Ok(Self::disabled())
            }
        }
    }

    /// Replace the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.generator.is_some()
    }

    /// Enhance a document
    ///
    /// Returns the document with a summary on success, the input document
    /// otherwise. Errors only when enhancement is required and failed.
    #[instrument(parent = ctx.span(), skip_all, fields(range = %document.metadata.range))]
    pub async fn enhance(
        &self,
        document: ChangelogDocument,
        ctx: &RunContext,
    ) -> Result<(ChangelogDocument, EnhancementReport)> {
        let Some(generator) = &self.generator else {
            return Ok((document, EnhancementReport::skipped()));
        };

        let wants_review = self.review_breaking && !document.breaking_changes.is_empty();
        let mut report = EnhancementReport {
            provider: Some(generator.name().to_string()),
            model: Some(generator.model().to_string()),
            ..EnhancementReport::skipped()
        };

        if !generator.check_connectivity().await {
            report.summary = StepOutcome::Failed("unreachable".to_string());
            if wants_review {
                report.review = StepOutcome::Failed("unreachable".to_string());
            }
            return self.degrade(document, report, "connectivity", ctx);
        }

        let payload = GenerationPayload::from_document(&document, self.max_samples);
        let summary_request = GenerationRequest::Summary(payload.clone());
        let review_request = GenerationRequest::BreakingReview(payload);

        let (summary, review) = tokio::join!(
            self.policy
                .run(summary_request.kind(), || generator.invoke(&summary_request)),
            async {
                if wants_review {
                    Some(
                        self.policy
                            .run(review_request.kind(), || generator.invoke(&review_request))
                            .await,
                    )
                } else {
                    None
                }
            }
        );

        let summary = match summary {
            Ok(GenerationOutput::Narrative(text)) => {
                report.summary = StepOutcome::Succeeded;
                Some(NarrativeSummary {
                    text,
                    provider: generator.name().to_string(),
                    model: generator.model().to_string(),
                })
            }
            Ok(_) => {
                report.summary = StepOutcome::Failed(
                    ProviderError::InvalidResponse("expected a narrative".to_string()).to_string(),
                );
                None
            }
            Err(e) => {
                report.summary = StepOutcome::Failed(e.to_string());
                None
            }
        };

        match review {
            Some(Ok(GenerationOutput::BreakingReview(findings))) => {
                report.review = StepOutcome::Succeeded;
                report.findings = Some(findings);
            }
            Some(Ok(_)) => {
                report.review = StepOutcome::Failed(
                    ProviderError::InvalidResponse("expected a breaking review".to_string())
                        .to_string(),
                );
            }
            Some(Err(e)) => report.review = StepOutcome::Failed(e.to_string()),
            None => {}
        }

        if report.is_degraded() {
            let document = match summary {
                Some(summary) if !self.required => document.with_summary(summary),
                _ => document,
            };
            return self.degrade(document, report, "generation", ctx);
        }

        info!(provider = generator.name(), "document enhanced");
        let document = match summary {
            Some(summary) => document.with_summary(summary),
            None => document,
        };
        Ok((document, report))
    }

    fn degrade(
        &self,
        document: ChangelogDocument,
        report: EnhancementReport,
        context: &str,
        ctx: &RunContext,
    ) -> Result<(ChangelogDocument, EnhancementReport)> {
        let failures: Vec<String> = [("summary", &report.summary), ("breaking review", &report.review)]
            .into_iter()
            .filter_map(|(name, outcome)| match outcome {
                StepOutcome::Failed(reason) => Some(format!("{}: {}", name, reason)),
                _ => None,
            })
            .collect();
        let message = failures.join("; ");

        if self.required {
            return Err(StageError::new(Stage::Enhancement, context, message).into());
        }

        warn!(%message, "continuing without text generation");
        ctx.record(Stage::Enhancement, None, message);
        Ok((document, report))
    }
}
