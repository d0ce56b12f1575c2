//! Changelog types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shiplog_git::{FileChange, FileSnapshot};

/// A footer field from a commit message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footer {
    /// Footer token (e.g., "BREAKING CHANGE", "Fixes", "Refs")
    pub token: String,
    /// Footer value, continuation lines joined with `\n`
    pub value: String,
}

impl Footer {
    /// Whether this footer announces a breaking change
    pub fn is_breaking(&self) -> bool {
        self.token.eq_ignore_ascii_case("BREAKING CHANGE")
            || self.token.eq_ignore_ascii_case("BREAKING-CHANGE")
    }
}

/// Lines added and removed across a commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub files: usize,
    pub insertions: usize,
    pub deletions: usize,
}

/// A classified commit
///
/// Produced by a [`CommitParser`](crate::parser::CommitParser) and finalized
/// by the [`BreakingDetector`](crate::breaking::BreakingDetector). Nothing
/// mutates a record after detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Full commit hash
    pub id: String,
    /// Abbreviated hash
    pub short_id: String,
    /// Author name
    pub author: String,
    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
    /// Raw message, subject and body
    pub message: String,
    /// Canonical type tag
    pub commit_type: String,
    /// Scope from the header
    pub scope: Option<String>,
    /// Short description
    pub description: String,
    /// Body without footers
    pub body: Option<String>,
    /// Footer fields
    pub footers: Vec<Footer>,
    /// Final breaking flag
    pub is_breaking: bool,
    /// Why the commit is breaking, in signal order
    pub breaking_reasons: Vec<String>,
    /// Changed files with line counts
    pub files: Vec<FileChange>,
    /// Version manifest contents around the commit
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub snapshots: Vec<FileSnapshot>,
}

impl CommitRecord {
    /// Summed diff statistics
    pub fn stats(&self) -> DiffStats {
        self.files.iter().fold(
            DiffStats {
                files: self.files.len(),
                ..DiffStats::default()
            },
            |mut acc, f| {
                acc.insertions += f.added;
                acc.deletions += f.removed;
                acc
            },
        )
    }

    /// Footer by token, case-insensitive
    pub fn footer(&self, token: &str) -> Option<&Footer> {
        self.footers.iter().find(|f| f.token.eq_ignore_ascii_case(token))
    }

    /// Reference used by document entries
    pub fn commit_ref(&self) -> CommitRef {
        CommitRef {
            id: self.id.clone(),
            short_id: self.short_id.clone(),
            author: self.author.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// A commit contributing to an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    pub id: String,
    pub short_id: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

/// One line of a section; several commits collapse into one entry when
/// their descriptions match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub description: String,
    pub scope: Option<String>,
    pub breaking: bool,
    pub commits: Vec<CommitRef>,
}

/// A section in a changelog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Type tag the section collects
    pub commit_type: String,
    /// Section title
    pub title: String,
    /// Assembled but not rendered by default
    #[serde(default)]
    pub hidden: bool,
    /// Entries in chronological order
    pub entries: Vec<Entry>,
}

impl Section {
    /// Create a new section
    pub fn new(commit_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            commit_type: commit_type.into(),
            title: title.into(),
            hidden: false,
            entries: Vec::new(),
        }
    }

    /// Check if section is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of commits across all entries
    pub fn commit_count(&self) -> usize {
        self.entries.iter().map(|e| e.commits.len()).sum()
    }
}

/// A deduplicated breaking change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakingChange {
    pub description: String,
    /// Ids of the commits that gave this reason
    pub commits: Vec<String>,
}

/// Where and when a document was produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Commit range expression
    pub range: String,
    pub generated_at: DateTime<Utc>,
    /// Commits that reached assembly
    pub total_commits: usize,
}

/// Narrative text from a text-generation backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeSummary {
    pub text: String,
    pub provider: String,
    pub model: String,
}

/// The assembled release document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangelogDocument {
    pub metadata: DocumentMetadata,
    pub sections: Vec<Section>,
    pub breaking_changes: Vec<BreakingChange>,
    /// Only set by the enhancer
    #[serde(default)]
    pub summary: Option<NarrativeSummary>,
}

impl ChangelogDocument {
    /// Sections a renderer should print
    pub fn visible_sections(&self, show_hidden: bool) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(move |s| show_hidden || !s.hidden)
    }

    /// Section by title
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// Check if the document has no content
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.breaking_changes.is_empty()
    }

    /// Copy of this document carrying a narrative summary
    pub fn with_summary(mut self, summary: NarrativeSummary) -> Self {
        self.summary = Some(summary);
        self
    }
}
