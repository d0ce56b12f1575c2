//! Conventional Commits parser
//!
//! Parses commits following the Conventional Commits specification:
//! https://www.conventionalcommits.org/
//!
//! Headers are mapped through the configured type table. Anything that does
//! not look like `type(scope)!: description` is kept, with the first line as
//! description and the fallback tag as type.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use shiplog_core::config::ChangelogConfig;
use shiplog_core::{ConfigError, RunContext, Stage};
use shiplog_git::CommitInfo;

use super::CommitParser;
use crate::types::{CommitRecord, Footer};

/// Regex for parsing conventional commit headers
static CONVENTIONAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<type>[a-zA-Z]+)(?:\((?P<scope>[^)]+)\))?(?P<breaking>!)?:\s+(?P<description>.+)$",
    )
    .expect("Invalid regex")
});

/// Regex for footer lines, `Token: value` or `Token #value`
static FOOTER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<token>BREAKING[ -]CHANGE|[A-Za-z][A-Za-z-]*)(?:: | (?P<hash>#))(?P<value>.*)$")
        .expect("Invalid regex")
});

/// Parser for Conventional Commits format
pub struct ConventionalParser {
    config: ChangelogConfig,
    ignore: Vec<Regex>,
}

impl ConventionalParser {
    /// Create a parser over a type table
    pub fn new(config: ChangelogConfig) -> Result<Self, ConfigError> {
        let ignore = config
            .ignore_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    ConfigError::invalid("changelog.ignore_patterns", format!("'{}': {}", p, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { config, ignore })
    }

    /// Parse the header line; `None` when it is not conventional
    fn parse_header<'a>(&self, subject: &'a str) -> Option<Header<'a>> {
        let caps = CONVENTIONAL_REGEX.captures(subject.trim())?;
        Some(Header {
            raw_type: caps.name("type")?.as_str(),
            scope: caps.name("scope").map(|m| m.as_str().trim()),
            breaking: caps.name("breaking").is_some(),
            description: caps.name("description")?.as_str().trim(),
        })
    }

    fn canonical_type(&self, raw_type: &str) -> String {
        match self.config.canonical_type(raw_type) {
            Some(tag) => tag.to_string(),
            None => raw_type.to_lowercase(),
        }
    }
}

struct Header<'a> {
    raw_type: &'a str,
    scope: Option<&'a str>,
    breaking: bool,
    description: &'a str,
}

/// A `BREAKING CHANGE:` line anywhere in the body
static BREAKING_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<token>BREAKING[ -]CHANGE):\s*(?P<value>.*)$").expect("Invalid regex")
});

/// Split a body into prose and footers.
///
/// Generic footers come from the trailer block of the last paragraph.
/// Breaking-change footers are recognized on any line, together with their
/// indented continuation lines.
fn parse_body(body: &str) -> (Option<String>, Vec<Footer>) {
    let lines: Vec<&str> = body.lines().collect();
    let last_paragraph = lines
        .iter()
        .rposition(|l| l.trim().is_empty())
        .map_or(0, |i| i + 1);
    let trailer_start = if lines
        .get(last_paragraph)
        .is_some_and(|first| FOOTER_REGEX.is_match(first))
    {
        last_paragraph
    } else {
        lines.len()
    };

    let mut footers: Vec<Footer> = Vec::new();
    let mut prose: Vec<&str> = Vec::new();
    let mut in_breaking = false;
    for line in &lines[..trailer_start] {
        if let Some(caps) = BREAKING_LINE_REGEX.captures(line) {
            footers.push(Footer {
                token: caps["token"].to_string(),
                value: caps["value"].trim().to_string(),
            });
            in_breaking = true;
        } else if in_breaking && line.starts_with(char::is_whitespace) && !line.trim().is_empty() {
            if let Some(last) = footers.last_mut() {
                last.value.push('\n');
                last.value.push_str(line.trim());
            }
        } else {
            in_breaking = false;
            // collapse the gap left by a removed footer
            if line.trim().is_empty() && prose.last().is_some_and(|l| l.trim().is_empty()) {
                continue;
            }
            prose.push(line);
        }
    }

    let mut trailers: Vec<Footer> = Vec::new();
    for line in &lines[trailer_start..] {
        if let Some(caps) = FOOTER_REGEX.captures(line) {
            let hash = caps.name("hash").map_or("", |m| m.as_str());
            let value = caps.name("value").map_or("", |m| m.as_str());
            let token = caps.name("token").map_or("", |m| m.as_str());
            trailers.push(Footer {
                token: token.to_string(),
                value: format!("{}{}", hash, value.trim()),
            });
        } else if let Some(last) = trailers.last_mut() {
            // Continuation of previous footer
            last.value.push('\n');
            last.value.push_str(line.trim());
        }
    }
    footers.extend(trailers);

    let text = prose.join("\n");
    let text = text.trim();
    ((!text.is_empty()).then(|| text.to_string()), footers)
}

impl CommitParser for ConventionalParser {
    fn parse(&self, commit: &CommitInfo, ctx: &RunContext) -> CommitRecord {
        let subject = commit.message.lines().next().unwrap_or_default().trim();
        let (body, footers) = match commit.body.as_deref() {
            Some(body) => parse_body(body),
            None => (None, Vec::new()),
        };

        let (commit_type, scope, marker, description) = match self.parse_header(subject) {
            Some(header) => (
                self.canonical_type(header.raw_type),
                header.scope.map(str::to_string),
                header.breaking,
                header.description.to_string(),
            ),
            None => {
                ctx.record(
                    Stage::Parsing,
                    Some(&commit.short_hash),
                    format!(
                        "not a conventional commit, filed under '{}'",
                        self.config.fallback_type
                    ),
                );
                let description = if subject.is_empty() {
                    "(no message)".to_string()
                } else {
                    subject.to_string()
                };
                (self.config.fallback_type.clone(), None, false, description)
            }
        };

        let mut breaking_reasons = Vec::new();
        if marker {
            breaking_reasons.push(format!("{} (marked with `!`)", description));
        }
        for footer in footers.iter().filter(|f| f.is_breaking()) {
            let value = footer.value.trim();
            breaking_reasons.push(if value.is_empty() {
                description.clone()
            } else {
                value.to_string()
            });
        }

        debug!(
            hash = %commit.short_hash,
            commit_type = %commit_type,
            breaking = !breaking_reasons.is_empty(),
            "commit parsed"
        );

        CommitRecord {
            id: commit.hash.clone(),
            short_id: commit.short_hash.clone(),
            author: commit.author.clone(),
            timestamp: commit.timestamp,
            message: commit.full_message(),
            commit_type,
            scope,
            description,
            body,
            footers,
            is_breaking: !breaking_reasons.is_empty(),
            breaking_reasons,
            files: commit.files.clone(),
            snapshots: commit.snapshots.clone(),
        }
    }

    fn should_include(&self, commit: &CommitInfo) -> bool {
        !self.ignore.iter().any(|re| re.is_match(&commit.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_commit(message: &str) -> CommitInfo {
        CommitInfo::new(
            "abc1234567890",
            message,
            "Test Author",
            "test@example.com",
            Utc::now(),
        )
    }

    fn parser() -> ConventionalParser {
        ConventionalParser::new(ChangelogConfig::default()).unwrap()
    }

    fn parse(message: &str, body: Option<&str>) -> CommitRecord {
        let mut commit = make_commit(message);
        commit.body = body.map(str::to_string);
        parser().parse(&commit, &RunContext::detached())
    }

    #[test]
    fn test_parse_simple_feat() {
        let parsed = parse("feat: add new feature", None);

        assert_eq!(parsed.commit_type, "feat");
        assert_eq!(parsed.description, "add new feature");
        assert!(parsed.scope.is_none());
        assert!(!parsed.is_breaking);
        assert!(parsed.breaking_reasons.is_empty());
    }

    #[test]
    fn test_parse_with_scope() {
        let parsed = parse("fix(parser): handle edge case", None);

        assert_eq!(parsed.commit_type, "fix");
        assert_eq!(parsed.scope.as_deref(), Some("parser"));
        assert_eq!(parsed.description, "handle edge case");
    }

    #[test]
    fn test_type_is_case_insensitive_and_aliased() {
        assert_eq!(parse("FEAT: shout", None).commit_type, "feat");
        assert_eq!(parse("feature: long form", None).commit_type, "feat");
        assert_eq!(parse("Bugfix(ui): alias", None).commit_type, "fix");
    }

    #[test]
    fn test_unconfigured_type_keeps_its_name() {
        let parsed = parse("ci: tweak pipeline", None);
        assert_eq!(parsed.commit_type, "ci");
    }

    #[test]
    fn test_parse_breaking_change_marker() {
        let parsed = parse("refactor(core)!: drop legacy loader", None);

        assert_eq!(parsed.commit_type, "refactor");
        assert!(parsed.is_breaking);
        assert_eq!(
            parsed.breaking_reasons,
            vec!["drop legacy loader (marked with `!`)".to_string()]
        );
    }

    #[test]
    fn test_breaking_change_footer_with_continuation() {
        let parsed = parse(
            "feat: new config format",
            Some("Rewrites the loader.\n\nBREAKING CHANGE: the `paths` key is gone\n  use `roots` instead\nRefs #42"),
        );

        assert!(parsed.is_breaking);
        assert_eq!(parsed.body.as_deref(), Some("Rewrites the loader."));
        assert_eq!(
            parsed.breaking_reasons,
            vec!["the `paths` key is gone\nuse `roots` instead".to_string()]
        );
        assert_eq!(parsed.footers.len(), 2);
        assert_eq!(parsed.footers[1].token, "Refs");
        assert_eq!(parsed.footers[1].value, "#42");
    }

    #[test]
    fn test_breaking_change_hyphen_token() {
        let parsed = parse("fix: x", Some("BREAKING-CHANGE: removed flag"));
        assert!(parsed.is_breaking);
        assert_eq!(parsed.breaking_reasons, vec!["removed flag".to_string()]);
        assert!(parsed.body.is_none());
    }

    #[test]
    fn test_breaking_footer_before_prose_paragraph() {
        let parsed = parse(
            "feat: new config",
            Some("BREAKING CHANGE: the paths key is gone\n  roots replace it\n\nSee the migration guide."),
        );

        assert!(parsed.is_breaking);
        assert_eq!(
            parsed.breaking_reasons,
            vec!["the paths key is gone\nroots replace it".to_string()]
        );
        assert_eq!(parsed.body.as_deref(), Some("See the migration guide."));
        assert_eq!(parsed.footers.len(), 1);
    }

    #[test]
    fn test_breaking_footer_between_paragraphs() {
        let parsed = parse(
            "fix: loader",
            Some("First paragraph.\n\nBREAKING-CHANGE: cache format changed\n\nLast words."),
        );

        assert_eq!(parsed.breaking_reasons, vec!["cache format changed".to_string()]);
        assert_eq!(parsed.body.as_deref(), Some("First paragraph.\n\nLast words."));
    }

    #[test]
    fn test_parse_with_footer() {
        let parsed = parse("feat: add feature", Some("Body text\n\nRefs: #123\nFixes: #456"));
        assert_eq!(parsed.footers.len(), 2);
        assert_eq!(parsed.footers[0].token, "Refs");
        assert_eq!(parsed.footers[0].value, "#123");
        assert_eq!(parsed.body.as_deref(), Some("Body text"));
    }

    #[test]
    fn test_body_without_footers_is_kept() {
        let parsed = parse(
            "feat: add feature",
            Some("This is the body\n\nWith multiple paragraphs."),
        );
        assert_eq!(
            parsed.body.as_deref(),
            Some("This is the body\n\nWith multiple paragraphs.")
        );
        assert!(parsed.footers.is_empty());
    }

    #[test]
    fn test_parse_non_conventional_falls_back() {
        let ctx = RunContext::detached();
        let parsed = parser().parse(&make_commit("Just a regular commit message"), &ctx);

        assert_eq!(parsed.commit_type, "other");
        assert_eq!(parsed.description, "Just a regular commit message");
        assert!(!parsed.is_breaking);
        assert_eq!(ctx.diagnostics_for(Stage::Parsing).len(), 1);
    }

    #[test]
    fn test_merge_commit_is_non_conventional() {
        let parsed = parse("Merge branch 'main' into topic", None);
        assert_eq!(parsed.commit_type, "other");
        assert_eq!(parsed.description, "Merge branch 'main' into topic");
    }

    #[test]
    fn test_empty_message_never_fails() {
        let parsed = parse("", None);
        assert_eq!(parsed.commit_type, "other");
        assert_eq!(parsed.description, "(no message)");
    }

    #[test]
    fn test_should_include_with_ignore_patterns() {
        let config = ChangelogConfig {
            ignore_patterns: vec![r"^chore\(release\):".to_string()],
            ..ChangelogConfig::default()
        };
        let parser = ConventionalParser::new(config).unwrap();

        assert!(parser.should_include(&make_commit("feat: feature")));
        assert!(!parser.should_include(&make_commit("chore(release): 1.2.0")));
    }

    #[test]
    fn test_invalid_ignore_pattern() {
        let config = ChangelogConfig {
            ignore_patterns: vec!["(".to_string()],
            ..ChangelogConfig::default()
        };
        assert!(matches!(
            ConventionalParser::new(config),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
