//! Breaking-change detection
//!
//! Combines independent signals per commit. The explicit marker set by the
//! parser always stands; the keyword scan, the public-interface heuristic and
//! the version-manifest heuristic add reasons on top of it. A non-breaking
//! footer suppresses the three heuristics but never the marker.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use semver::Version;
use tracing::debug;

use shiplog_core::config::BreakingConfig;
use shiplog_core::{ConfigError, RunContext, Stage};
use shiplog_git::FileStatus;

use crate::types::CommitRecord;

/// `version = "x.y.z"` (TOML) or `"version": "x.y.z"` (JSON)
static VERSION_FIELD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*"?version"?\s*[:=]\s*"v?(?P<version>[0-9][^"]*)""#).expect("Invalid regex")
});

/// A file whose only content is a version
static BARE_VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*v?(?P<version>\d+\.\d+\.\d+\S*)\s*$").expect("Invalid regex")
});

static TRIPLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)\.(\d+)").expect("Invalid regex")
});

/// Per-commit breaking-change detector
pub struct BreakingDetector {
    keywords: Vec<(String, Regex)>,
    public_interface: GlobSet,
    version_files: GlobSet,
    non_breaking_tokens: Vec<String>,
}

impl BreakingDetector {
    /// Compile the configured keywords and globs
    pub fn new(config: &BreakingConfig) -> Result<Self, ConfigError> {
        let keywords = config
            .keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .map(|k| {
                let words: Vec<String> = k.split_whitespace().map(regex::escape).collect();
                let pattern = format!(r"(?i)\b{}\b", words.join(r"\s+"));
                Regex::new(&pattern)
                    .map(|re| (k.trim().to_string(), re))
                    .map_err(|e| ConfigError::invalid("breaking.keywords", e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            keywords,
            public_interface: build_globset(
                &config.public_interface_globs,
                "breaking.public_interface_globs",
            )?,
            version_files: build_globset(&config.version_files, "breaking.version_files")?,
            non_breaking_tokens: config.non_breaking_tokens.clone(),
        })
    }

    /// Finalize a record's breaking flag and reasons
    pub fn detect(&self, mut record: CommitRecord, ctx: &RunContext) -> CommitRecord {
        let mut heuristic = Vec::new();
        heuristic.extend(self.keyword_reasons(&record));
        heuristic.extend(self.structural_reasons(&record));
        heuristic.extend(self.version_reasons(&record));

        if !heuristic.is_empty() && self.is_annotated_non_breaking(&record) {
            ctx.record(
                Stage::Detection,
                Some(&record.short_id),
                format!(
                    "non-breaking annotation suppressed {} heuristic signal(s)",
                    heuristic.len()
                ),
            );
            heuristic.clear();
        }

        let mut seen: HashSet<String> = record.breaking_reasons.iter().map(|r| normalize(r)).collect();
        for reason in heuristic {
            if seen.insert(normalize(&reason)) {
                record.breaking_reasons.push(reason);
            }
        }
        record.is_breaking = !record.breaking_reasons.is_empty();

        debug!(
            hash = %record.short_id,
            breaking = record.is_breaking,
            reasons = record.breaking_reasons.len(),
            "breaking signals evaluated"
        );
        record
    }

    fn is_annotated_non_breaking(&self, record: &CommitRecord) -> bool {
        self.non_breaking_tokens
            .iter()
            .any(|token| record.footer(token).is_some())
    }

    /// Scans the prose body and the values of trailer footers such as
    /// `Note: ...`; breaking footers already carry their own reason
    fn keyword_reasons(&self, record: &CommitRecord) -> Vec<String> {
        let text: Vec<&str> = record
            .body
            .as_deref()
            .into_iter()
            .chain(
                record
                    .footers
                    .iter()
                    .filter(|f| !f.is_breaking())
                    .map(|f| f.value.as_str()),
            )
            .collect();
        if text.is_empty() {
            return Vec::new();
        }
        let text = text.join("\n");
        self.keywords
            .iter()
            .filter(|(_, re)| re.is_match(&text))
            .map(|(keyword, _)| format!("body mentions \"{}\"", keyword))
            .collect()
    }

    fn structural_reasons(&self, record: &CommitRecord) -> Vec<String> {
        record
            .files
            .iter()
            .filter(|f| self.public_interface.is_match(&f.path))
            .filter_map(|f| {
                if f.status == FileStatus::Deleted {
                    Some(format!("public interface file {} was deleted", f.path))
                } else if f.removed > 0 && f.added == 0 {
                    Some(format!(
                        "public interface file {} lost {} line(s) with nothing added",
                        f.path, f.removed
                    ))
                } else {
                    None
                }
            })
            .collect()
    }

    fn version_reasons(&self, record: &CommitRecord) -> Vec<String> {
        record
            .files
            .iter()
            .filter(|f| self.is_version_file(&f.path))
            .filter_map(|f| {
                let snapshot = record.snapshots.iter().find(|s| s.path == f.path)?;
                let before = extract_version(snapshot.before.as_deref()?)?;
                let after = extract_version(snapshot.after.as_deref()?)?;
                (after.major != before.major).then(|| {
                    let direction = if after.major > before.major {
                        "bumped"
                    } else {
                        "lowered"
                    };
                    format!(
                        "{} major version {} from {} to {}",
                        f.path, direction, before, after
                    )
                })
            })
            .collect()
    }

    /// Whether a path is a configured version manifest, by path or file name
    pub fn is_version_file(&self, path: &str) -> bool {
        self.version_files.is_match(path)
            || Path::new(path)
                .file_name()
                .is_some_and(|name| self.version_files.is_match(name))
    }
}

fn build_globset(patterns: &[String], field: &str) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| ConfigError::invalid(field, format!("'{}': {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| ConfigError::invalid(field, e.to_string()))
}

/// Pull a major.minor.patch triple out of a manifest
fn extract_version(content: &str) -> Option<Version> {
    let raw = VERSION_FIELD_REGEX
        .captures(content)
        .or_else(|| BARE_VERSION_REGEX.captures(content))?
        .name("version")?
        .as_str();

    if let Ok(version) = Version::parse(raw) {
        return Some(version);
    }
    let caps = TRIPLE_REGEX.captures(raw)?;
    Some(Version::new(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    ))
}

/// Lowercase and collapse whitespace
pub(crate) fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Footer;
    use chrono::Utc;
    use shiplog_git::{FileChange, FileSnapshot};

    fn record(description: &str) -> CommitRecord {
        CommitRecord {
            id: "abc1234567890".to_string(),
            short_id: "abc1234".to_string(),
            author: "Test".to_string(),
            timestamp: Utc::now(),
            message: description.to_string(),
            commit_type: "feat".to_string(),
            scope: None,
            description: description.to_string(),
            body: None,
            footers: vec![],
            is_breaking: false,
            breaking_reasons: vec![],
            files: vec![],
            snapshots: vec![],
        }
    }

    fn detector() -> BreakingDetector {
        BreakingDetector::new(&BreakingConfig::default()).unwrap()
    }

    fn manifest_bump(before: &str, after: &str) -> CommitRecord {
        let mut r = record("bump");
        r.files.push(FileChange::new("crates/x/Cargo.toml", FileStatus::Modified, 1, 1));
        r.snapshots.push(FileSnapshot {
            path: "crates/x/Cargo.toml".to_string(),
            before: Some(format!("[package]\nname = \"x\"\nversion = \"{}\"\n", before)),
            after: Some(format!("[package]\nname = \"x\"\nversion = \"{}\"\n", after)),
        });
        r
    }

    #[test]
    fn test_no_signals_is_not_breaking() {
        let mut r = record("add widget");
        r.body = Some("Adds a widget to the toolbar.".to_string());
        r.files.push(FileChange::new("src/api/widget.rs", FileStatus::Modified, 10, 3));

        let out = detector().detect(r, &RunContext::detached());
        assert!(!out.is_breaking);
        assert!(out.breaking_reasons.is_empty());
    }

    #[test]
    fn test_marker_is_kept() {
        let mut r = record("drop v1");
        r.is_breaking = true;
        r.breaking_reasons.push("drop v1 (marked with `!`)".to_string());

        let out = detector().detect(r, &RunContext::detached());
        assert!(out.is_breaking);
        assert_eq!(out.breaking_reasons.len(), 1);
    }

    #[test]
    fn test_keyword_scan_is_case_insensitive_and_word_bounded() {
        let mut r = record("cleanup");
        r.body = Some("The old flag is DEPRECATED now.".to_string());
        let out = detector().detect(r, &RunContext::detached());
        assert_eq!(out.breaking_reasons, vec!["body mentions \"deprecated\"".to_string()]);

        let mut r = record("cleanup");
        r.body = Some("Nothing unremovedable here.".to_string());
        assert!(!detector().detect(r, &RunContext::detached()).is_breaking);
    }

    #[test]
    fn test_keyword_scan_reads_trailer_values() {
        let mut r = record("tidy cli");
        r.footers.push(Footer {
            token: "Note".to_string(),
            value: "the --legacy flag is deprecated".to_string(),
        });
        let out = detector().detect(r, &RunContext::detached());
        assert_eq!(out.breaking_reasons, vec!["body mentions \"deprecated\"".to_string()]);

        // breaking footers are not rescanned for keywords
        let mut r = record("x");
        r.footers.push(Footer {
            token: "BREAKING CHANGE".to_string(),
            value: "removed the flag".to_string(),
        });
        r.breaking_reasons.push("removed the flag".to_string());
        let out = detector().detect(r, &RunContext::detached());
        assert_eq!(out.breaking_reasons, vec!["removed the flag".to_string()]);
    }

    #[test]
    fn test_multi_word_keyword_spans_whitespace() {
        let mut r = record("x");
        r.body = Some("This is a Breaking\n   change for callers".to_string());
        let out = detector().detect(r, &RunContext::detached());
        assert!(out
            .breaking_reasons
            .contains(&"body mentions \"breaking change\"".to_string()));
    }

    #[test]
    fn test_structural_removal_in_public_interface() {
        let mut r = record("trim api");
        r.files.push(FileChange::new("src/api/users.rs", FileStatus::Modified, 0, 12));
        r.files.push(FileChange::new("proto/v1/service.proto", FileStatus::Deleted, 0, 40));
        r.files.push(FileChange::new("src/internal.rs", FileStatus::Deleted, 0, 5));

        let out = detector().detect(r, &RunContext::detached());
        assert!(out.is_breaking);
        assert_eq!(out.breaking_reasons.len(), 2);
        assert!(out.breaking_reasons[0].contains("src/api/users.rs"));
        assert!(out.breaking_reasons[1].contains("proto/v1/service.proto"));
    }

    #[test]
    fn test_version_major_bump() {
        let out = detector().detect(manifest_bump("1.4.2", "2.0.0"), &RunContext::detached());
        assert_eq!(
            out.breaking_reasons,
            vec!["crates/x/Cargo.toml major version bumped from 1.4.2 to 2.0.0".to_string()]
        );
    }

    #[test]
    fn test_version_major_downgrade() {
        let out = detector().detect(manifest_bump("2.3.0", "1.0.0"), &RunContext::detached());
        assert_eq!(
            out.breaking_reasons,
            vec!["crates/x/Cargo.toml major version lowered from 2.3.0 to 1.0.0".to_string()]
        );
    }

    #[test]
    fn test_version_minor_bump_is_not_breaking() {
        let out = detector().detect(manifest_bump("1.4.2", "1.5.0"), &RunContext::detached());
        assert!(!out.is_breaking);
    }

    #[test]
    fn test_non_breaking_footer_suppresses_heuristics_only() {
        let ctx = RunContext::detached();
        let mut r = manifest_bump("1.0.0", "2.0.0");
        r.footers.push(Footer {
            token: "Non-Breaking".to_string(),
            value: "API unchanged".to_string(),
        });
        let out = detector().detect(r.clone(), &ctx);
        assert!(!out.is_breaking);
        assert_eq!(ctx.diagnostics_for(Stage::Detection).len(), 1);

        r.breaking_reasons.push("bump (marked with `!`)".to_string());
        let out = detector().detect(r, &RunContext::detached());
        assert!(out.is_breaking);
        assert_eq!(out.breaking_reasons, vec!["bump (marked with `!`)".to_string()]);
    }

    #[test]
    fn test_duplicate_reasons_collapse() {
        let mut r = record("x");
        r.body = Some("removed the thing".to_string());
        r.breaking_reasons.push("Body   mentions \"REMOVED\"".to_string());
        let out = detector().detect(r, &RunContext::detached());
        assert_eq!(out.breaking_reasons.len(), 1);
    }

    #[test]
    fn test_extract_version_forms() {
        assert_eq!(extract_version("version = \"1.2.3\"").unwrap(), Version::new(1, 2, 3));
        assert_eq!(
            extract_version("{\n  \"name\": \"x\",\n  \"version\": \"3.0.0-beta.1\"\n}")
                .unwrap()
                .major,
            3
        );
        assert_eq!(extract_version("v4.1.0\n").unwrap(), Version::new(4, 1, 0));
        assert!(extract_version("no version here").is_none());
    }

    #[test]
    fn test_version_file_matches_by_name() {
        let d = detector();
        assert!(d.is_version_file("Cargo.toml"));
        assert!(d.is_version_file("packages/web/package.json"));
        assert!(!d.is_version_file("src/version.rs"));
    }
}
