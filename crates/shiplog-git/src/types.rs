//! Raw commit records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a file changed in a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

/// A changed file with coarse line statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Repository-relative path, `/`-separated
    pub path: String,
    /// Change kind
    pub status: FileStatus,
    /// Lines added
    pub added: usize,
    /// Lines removed
    pub removed: usize,
}

impl FileChange {
    /// Create a file change
    pub fn new(path: impl Into<String>, status: FileStatus, added: usize, removed: usize) -> Self {
        Self {
            path: path.into(),
            status,
            added,
            removed,
        }
    }
}

/// File contents on both sides of a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSnapshot {
    pub path: String,
    /// Content in the first parent, if the file existed there
    pub before: Option<String>,
    /// Content in the commit, if the file still exists
    pub after: Option<String>,
}

/// Information about a git commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Commit hash (full)
    pub hash: String,
    /// Short hash (first 7 characters)
    pub short_hash: String,
    /// Commit message (first line)
    pub message: String,
    /// Message text after the subject line
    pub body: Option<String>,
    /// Author name
    pub author: String,
    /// Author email
    pub author_email: String,
    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
    /// Files touched by the commit
    #[serde(default)]
    pub files: Vec<FileChange>,
    /// Before/after contents of requested files
    #[serde(default)]
    pub snapshots: Vec<FileSnapshot>,
}

impl CommitInfo {
    /// Create a new CommitInfo
    pub fn new(
        hash: impl Into<String>,
        message: impl Into<String>,
        author: impl Into<String>,
        author_email: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let hash = hash.into();
        let short_hash = hash.chars().take(7).collect();

        Self {
            hash,
            short_hash,
            message: message.into(),
            body: None,
            author: author.into(),
            author_email: author_email.into(),
            timestamp,
            files: Vec::new(),
            snapshots: Vec::new(),
        }
    }

    /// Build from a full message; the text after the first line becomes the body
    pub fn from_full_message(
        hash: impl Into<String>,
        full_message: &str,
        author: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let (subject, rest) = match full_message.split_once('\n') {
            Some((subject, rest)) => (subject, rest.trim()),
            None => (full_message, ""),
        };
        let mut info = Self::new(hash, subject.trim_end(), author, "", timestamp);
        if !rest.is_empty() {
            info.body = Some(rest.to_string());
        }
        info
    }

    /// Set the commit body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        self.body = if body.trim().is_empty() { None } else { Some(body) };
        self
    }

    /// Add a changed file
    pub fn with_file(mut self, file: FileChange) -> Self {
        self.files.push(file);
        self
    }

    /// Add a snapshot
    pub fn with_snapshot(mut self, snapshot: FileSnapshot) -> Self {
        self.snapshots.push(snapshot);
        self
    }

    /// Get the full message including body
    pub fn full_message(&self) -> String {
        match &self.body {
            Some(body) => format!("{}\n\n{}", self.message, body),
            None => self.message.clone(),
        }
    }

    /// Snapshot for a path, if one was captured
    pub fn snapshot(&self, path: &str) -> Option<&FileSnapshot> {
        self.snapshots.iter().find(|s| s.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_info() {
        let commit = CommitInfo::new(
            "abc1234567890",
            "feat: add feature",
            "Author",
            "author@example.com",
            Utc::now(),
        );
        assert_eq!(commit.short_hash, "abc1234");
        assert_eq!(commit.message, "feat: add feature");
        assert!(commit.files.is_empty());
    }

    #[test]
    fn test_from_full_message_splits_body() {
        let commit = CommitInfo::from_full_message(
            "abc1234567890",
            "fix: thing\n\nLonger text.\n\nBREAKING CHANGE: gone",
            "Author",
            Utc::now(),
        );
        assert_eq!(commit.message, "fix: thing");
        assert_eq!(commit.body.as_deref(), Some("Longer text.\n\nBREAKING CHANGE: gone"));
        assert!(commit.full_message().starts_with("fix: thing\n\n"));
    }

    #[test]
    fn test_empty_body_is_none() {
        let commit = CommitInfo::new("a", "chore: x", "A", "a@x", Utc::now()).with_body("  ");
        assert!(commit.body.is_none());
    }
}
