//! Changelog renderers

mod html;
mod json;
mod markdown;
mod registry;

pub use html::HtmlRenderer;
pub use json::JsonRenderer;
pub use markdown::MarkdownRenderer;
pub use registry::RendererRegistry;

use chrono::{DateTime, SecondsFormat, Utc};
use shiplog_core::config::OutputFormat;
use shiplog_core::Result;

use crate::types::{ChangelogDocument, CommitRef};

/// Trait for changelog renderers
///
/// Rendering the same document twice must give byte-identical output.
pub trait ChangelogRenderer: Send + Sync {
    /// Render a document to string
    fn render(&self, document: &ChangelogDocument) -> Result<String>;

    /// Format this renderer produces
    fn format(&self) -> OutputFormat;

    /// Get the file extension for this format
    fn extension(&self) -> &'static str {
        self.format().extension()
    }
}

/// ISO-8601 timestamp, second precision, `Z` suffix
pub(crate) fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn short_id(id: &str) -> &str {
    id.char_indices().nth(7).map_or(id, |(i, _)| &id[..i])
}

/// Distinct authors in first-seen order
pub(crate) fn authors(commits: &[CommitRef]) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for commit in commits {
        if !out.contains(&commit.author.as_str()) {
            out.push(&commit.author);
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::TimeZone;

    use super::*;
    use crate::types::{BreakingChange, DocumentMetadata, Entry, Section};

    fn commit(id: &str, author: &str) -> CommitRef {
        CommitRef {
            id: id.to_string(),
            short_id: short_id(id).to_string(),
            author: author.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    pub fn document() -> ChangelogDocument {
        let mut features = Section::new("feat", "Features");
        features.entries.push(Entry {
            description: "add OAuth2 support".to_string(),
            scope: Some("auth".to_string()),
            breaking: false,
            commits: vec![commit("aaaaaaa1111", "Ada")],
        });
        let mut fixes = Section::new("fix", "Bug Fixes");
        fixes.entries.push(Entry {
            description: "remove deprecated /v1 endpoint".to_string(),
            scope: None,
            breaking: true,
            commits: vec![commit("bbbbbbb2222", "Grace")],
        });
        fixes.entries.push(Entry {
            description: "escape <script> & \"quotes\"".to_string(),
            scope: None,
            breaking: false,
            commits: vec![commit("ccccccc3333", "Ada"), commit("ddddddd4444", "Linus")],
        });
        let mut chores = Section::new("chore", "Chores");
        chores.hidden = true;
        chores.entries.push(Entry {
            description: "update deps".to_string(),
            scope: None,
            breaking: false,
            commits: vec![commit("eeeeeee5555", "Ada")],
        });

        ChangelogDocument {
            metadata: DocumentMetadata {
                range: "v1.0.0..HEAD".to_string(),
                generated_at: Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).unwrap(),
                total_commits: 5,
            },
            sections: vec![features, fixes, chores],
            breaking_changes: vec![BreakingChange {
                description: "remove deprecated /v1 endpoint (marked with `!`)".to_string(),
                commits: vec!["bbbbbbb2222".to_string()],
            }],
            summary: None,
        }
    }
}
