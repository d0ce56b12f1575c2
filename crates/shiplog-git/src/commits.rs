//! Commit range reading

use std::fmt;

use chrono::{TimeZone, Utc};
use git2::{Delta, Oid, Sort};
use tracing::{debug, info, instrument};

use shiplog_core::error::GitError;

use crate::repository::{GitRepo, Result};
use crate::types::{CommitInfo, FileChange, FileSnapshot, FileStatus};

/// A `<from>..<to>` range; `from` is exclusive and optional
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRange {
    pub from: Option<String>,
    pub to: String,
}

impl CommitRange {
    /// Parse `a..b`, `..b`, `a..` or a single revision
    pub fn parse(expr: &str) -> Result<Self> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(GitError::InvalidRange(expr.to_string()));
        }

        match expr.split_once("..") {
            Some((from, to)) => {
                if to.starts_with('.') {
                    return Err(GitError::InvalidRange(expr.to_string()));
                }
                let from = (!from.is_empty()).then(|| from.to_string());
                let to = if to.is_empty() { "HEAD" } else { to };
                Ok(Self {
                    from,
                    to: to.to_string(),
                })
            }
            None => Ok(Self {
                from: None,
                to: expr.to_string(),
            }),
        }
    }

    /// Range from a revision up to HEAD
    pub fn since(from: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            to: "HEAD".to_string(),
        }
    }

    /// Every commit reachable from HEAD
    pub fn all() -> Self {
        Self {
            from: None,
            to: "HEAD".to_string(),
        }
    }
}

impl fmt::Display for CommitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.from {
            Some(from) => write!(f, "{}..{}", from, self.to),
            None => f.write_str(&self.to),
        }
    }
}

impl GitRepo {
    /// Read the commits in a range, oldest first.
    ///
    /// `snapshot` selects the paths whose before/after contents are captured.
    #[instrument(skip(self, snapshot), fields(range = %range))]
    pub fn commits_in_range<F>(&self, range: &CommitRange, snapshot: F) -> Result<Vec<CommitInfo>>
    where
        F: Fn(&str) -> bool,
    {
        let to = self.resolve(&range.to)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME | Sort::REVERSE)?;
        revwalk.push(to)?;
        if let Some(from) = &range.from {
            revwalk.hide(self.resolve(from)?)?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            commits.push(self.commit_to_info(&commit, &snapshot)?);
        }

        info!(count = commits.len(), "read commits");
        Ok(commits)
    }

    fn resolve(&self, rev: &str) -> Result<Oid> {
        let object = self
            .repo
            .revparse_single(rev)
            .map_err(|e| GitError::InvalidRevision {
                rev: rev.to_string(),
                reason: e.message().to_string(),
            })?;
        let commit = object.peel_to_commit().map_err(|e| GitError::InvalidRevision {
            rev: rev.to_string(),
            reason: e.message().to_string(),
        })?;
        Ok(commit.id())
    }

    fn commit_to_info<F>(&self, commit: &git2::Commit<'_>, snapshot: &F) -> Result<CommitInfo>
    where
        F: Fn(&str) -> bool,
    {
        let author = commit.author();
        let timestamp = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .unwrap_or_else(Utc::now);

        let mut info = CommitInfo::new(
            commit.id().to_string(),
            commit.summary().unwrap_or("(no message)"),
            author.name().unwrap_or("Unknown"),
            author.email().unwrap_or("unknown@example.com"),
            timestamp,
        )
        .with_body(commit.body().unwrap_or_default());

        let tree = commit.tree()?;
        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(parent.tree()?),
            Err(_) => None,
        };
        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        for (idx, delta) in diff.deltas().enumerate() {
            let status = match delta.status() {
                Delta::Added | Delta::Copied => FileStatus::Added,
                Delta::Deleted => FileStatus::Deleted,
                Delta::Renamed => FileStatus::Renamed,
                _ => FileStatus::Modified,
            };
            let file = if status == FileStatus::Deleted {
                delta.old_file()
            } else {
                delta.new_file()
            };
            let Some(path) = file.path().map(|p| p.to_string_lossy().replace('\\', "/")) else {
                continue;
            };

            let (added, removed) = match git2::Patch::from_diff(&diff, idx)? {
                Some(patch) => {
                    let (_, additions, deletions) = patch.line_stats()?;
                    (additions, deletions)
                }
                None => (0, 0),
            };

            if snapshot(&path) {
                info = info.with_snapshot(FileSnapshot {
                    path: path.clone(),
                    before: self.blob_text(delta.old_file().id()),
                    after: self.blob_text(delta.new_file().id()),
                });
            }
            info = info.with_file(FileChange::new(path, status, added, removed));
        }

        debug!(hash = %info.short_hash, files = info.files.len(), "commit read");
        Ok(info)
    }

    fn blob_text(&self, id: Oid) -> Option<String> {
        if id.is_zero() {
            return None;
        }
        let blob = self.repo.find_blob(id).ok()?;
        std::str::from_utf8(blob.content()).ok().map(str::to_string)
    }
}
