//! Requests and replies exchanged with a text-generation backend
//!
//! The payload is a bounded digest of the document: section titles with
//! counts, the breaking list and a few sample descriptions per section.
//! Nothing else about the commits leaves the process.

use serde::{Deserialize, Serialize};
use shiplog_changelog::ChangelogDocument;

use crate::error::ProviderError;

/// One section as seen by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDigest {
    pub title: String,
    pub entry_count: usize,
    /// At most `max_samples` entry descriptions
    pub samples: Vec<String>,
}

/// Bounded digest of a changelog document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationPayload {
    pub range: String,
    pub total_commits: usize,
    pub sections: Vec<SectionDigest>,
    pub breaking_changes: Vec<String>,
}

impl GenerationPayload {
    /// Digest a document, keeping `max_samples` descriptions per section
    pub fn from_document(document: &ChangelogDocument, max_samples: usize) -> Self {
        Self {
            range: document.metadata.range.clone(),
            total_commits: document.metadata.total_commits,
            sections: document
                .sections
                .iter()
                .map(|s| SectionDigest {
                    title: s.title.clone(),
                    entry_count: s.entries.len(),
                    samples: s
                        .entries
                        .iter()
                        .take(max_samples)
                        .map(|e| match &e.scope {
                            Some(scope) => format!("{}: {}", scope, e.description),
                            None => e.description.clone(),
                        })
                        .collect(),
                })
                .collect(),
            breaking_changes: document
                .breaking_changes
                .iter()
                .map(|b| b.description.clone())
                .collect(),
        }
    }

    /// Plain-text rendering used inside prompts
    pub fn to_prompt_text(&self) -> String {
        let mut text = format!(
            "Range: {}\nCommits: {}\n",
            self.range, self.total_commits
        );
        for section in &self.sections {
            text.push_str(&format!("\n{} ({} entries)\n", section.title, section.entry_count));
            for sample in &section.samples {
                text.push_str(&format!("- {}\n", sample));
            }
        }
        if !self.breaking_changes.is_empty() {
            text.push_str("\nBreaking changes:\n");
            for change in &self.breaking_changes {
                text.push_str(&format!("- {}\n", change.replace('\n', " ")));
            }
        }
        text
    }
}

/// What to ask the backend for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    /// A short narrative of the release
    Summary(GenerationPayload),
    /// Corroboration of the detected breaking changes
    BreakingReview(GenerationPayload),
}

const SUMMARY_SYSTEM: &str = "You write release notes. Reply with a plain-text summary of \
two to four sentences for end users. Mention breaking changes first when there are any. \
Do not use headings, lists or markdown.";

const REVIEW_SYSTEM: &str = "You review breaking-change lists for software releases. Reply \
with a single JSON object and nothing else, shaped as \
{\"confirmed\": [..], \"disputed\": [..], \"additional\": [..]}. \"confirmed\" and \
\"disputed\" contain items copied verbatim from the given list; \"additional\" names \
changes from the sections that look breaking but are missing from the list.";

impl GenerationRequest {
    /// Short label for logs and reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Summary(_) => "summary",
            Self::BreakingReview(_) => "breaking review",
        }
    }

    pub fn payload(&self) -> &GenerationPayload {
        match self {
            Self::Summary(p) | Self::BreakingReview(p) => p,
        }
    }

    /// System instructions for chat-style backends
    pub fn system_prompt(&self) -> &'static str {
        match self {
            Self::Summary(_) => SUMMARY_SYSTEM,
            Self::BreakingReview(_) => REVIEW_SYSTEM,
        }
    }

    /// User message carrying the payload
    pub fn user_prompt(&self) -> String {
        let lead = match self {
            Self::Summary(_) => "Summarize this release.",
            Self::BreakingReview(_) => "Review the breaking changes of this release.",
        };
        format!("{}\n\n{}", lead, self.payload().to_prompt_text())
    }

    /// Turn a raw text reply into the output this request expects
    pub fn interpret(&self, reply: &str) -> Result<GenerationOutput, ProviderError> {
        match self {
            Self::Summary(_) => {
                let text = reply.trim();
                if text.is_empty() {
                    Err(ProviderError::InvalidResponse("empty summary".to_string()))
                } else {
                    Ok(GenerationOutput::Narrative(text.to_string()))
                }
            }
            Self::BreakingReview(_) => BreakingReview::parse(reply).map(GenerationOutput::BreakingReview),
        }
    }
}

/// Structured refinement of the breaking list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakingReview {
    pub confirmed: Vec<String>,
    pub disputed: Vec<String>,
    pub additional: Vec<String>,
}

impl BreakingReview {
    /// Parse the first JSON object in a reply; models often wrap it in prose
    pub fn parse(reply: &str) -> Result<Self, ProviderError> {
        let start = reply.find('{');
        let end = reply.rfind('}');
        match (start, end) {
            (Some(start), Some(end)) if start < end => serde_json::from_str(&reply[start..=end])
                .map_err(|e| ProviderError::InvalidResponse(format!("breaking review: {}", e))),
            _ => Err(ProviderError::InvalidResponse(
                "breaking review reply has no JSON object".to_string(),
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.confirmed.is_empty() && self.disputed.is_empty() && self.additional.is_empty()
    }
}

/// A backend reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutput {
    Narrative(String),
    BreakingReview(BreakingReview),
}
