//! Markdown changelog renderer

use shiplog_core::config::{OutputFormat, RenderConfig};
use shiplog_core::Result;
use tracing::{debug, instrument};

use super::{authors, short_id, timestamp, ChangelogRenderer};
use crate::types::ChangelogDocument;

/// Markdown changelog renderer
pub struct MarkdownRenderer {
    config: RenderConfig,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    fn hash_link(&self, id: &str) -> String {
        let short = short_id(id);
        match &self.config.repo_url {
            Some(url) => format!("[{}]({}/commit/{})", short, url.trim_end_matches('/'), id),
            None => short.to_string(),
        }
    }

    fn hashes<'a>(&self, ids: impl Iterator<Item = &'a str>) -> String {
        if !self.config.include_hashes {
            return String::new();
        }
        let links: Vec<String> = ids.map(|id| self.hash_link(id)).collect();
        if links.is_empty() {
            String::new()
        } else {
            format!(" ({})", links.join(", "))
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl ChangelogRenderer for MarkdownRenderer {
    #[instrument(skip(self, document), fields(range = %document.metadata.range, section_count = document.sections.len()))]
    fn render(&self, document: &ChangelogDocument) -> Result<String> {
        let mut output = String::new();
        let meta = &document.metadata;

        output.push_str(&format!("# {}\n\n", self.config.title));
        output.push_str(&format!("## {}\n\n", meta.range));
        output.push_str(&format!(
            "_Generated {} from {} commit{}._\n\n",
            timestamp(&meta.generated_at),
            meta.total_commits,
            if meta.total_commits == 1 { "" } else { "s" }
        ));

        if let Some(summary) = &document.summary {
            output.push_str(summary.text.trim());
            output.push_str("\n\n");
        }

        // Breaking changes
        if !document.breaking_changes.is_empty() {
            output.push_str("### ⚠ BREAKING CHANGES\n\n");
            for change in &document.breaking_changes {
                let description = change.description.replace('\n', " ");
                output.push_str(&format!(
                    "- {}{}\n",
                    description,
                    self.hashes(change.commits.iter().map(String::as_str))
                ));
            }
            output.push('\n');
        }

        // Sections
        for section in document.visible_sections(self.config.show_hidden) {
            output.push_str(&format!("### {}\n\n", section.title));

            for entry in &section.entries {
                output.push_str("- ");
                if entry.breaking {
                    output.push_str("⚠ ");
                }
                if let Some(scope) = &entry.scope {
                    output.push_str(&format!("**{}:** ", scope));
                }
                output.push_str(&entry.description);
                output.push_str(&self.hashes(entry.commits.iter().map(|c| c.id.as_str())));
                if self.config.include_authors {
                    output.push_str(&format!(" - {}", authors(&entry.commits).join(", ")));
                }
                output.push('\n');
            }

            output.push('\n');
        }

        let mut output = output.trim_end().to_string();
        output.push('\n');
        debug!(output_len = output.len(), "markdown changelog rendered");
        Ok(output)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::fixtures;
    use crate::types::NarrativeSummary;

    #[test]
    fn test_render_basic() {
        let output = MarkdownRenderer::default().render(&fixtures::document()).unwrap();

        assert!(output.starts_with("# Changelog\n\n## v1.0.0..HEAD\n\n"));
        assert!(output.contains("_Generated 2024-05-02T08:30:00Z from 5 commits._"));
        assert!(output.contains("### Features\n\n- **auth:** add OAuth2 support (aaaaaaa)\n"));
        assert!(output.contains("- ⚠ remove deprecated /v1 endpoint (bbbbbbb)\n"));
        assert!(output.contains("(ccccccc, ddddddd)"));
    }

    #[test]
    fn test_breaking_block_comes_first() {
        let output = MarkdownRenderer::default().render(&fixtures::document()).unwrap();
        let breaking = output.find("### ⚠ BREAKING CHANGES").unwrap();
        let features = output.find("### Features").unwrap();
        assert!(breaking < features);
        assert!(output.contains("- remove deprecated /v1 endpoint (marked with `!`) (bbbbbbb)"));
    }

    #[test]
    fn test_hidden_sections_skipped_unless_requested() {
        let doc = fixtures::document();
        let output = MarkdownRenderer::default().render(&doc).unwrap();
        assert!(!output.contains("### Chores"));

        let config = RenderConfig {
            show_hidden: true,
            ..RenderConfig::default()
        };
        let output = MarkdownRenderer::new(config).render(&doc).unwrap();
        assert!(output.contains("### Chores"));
    }

    #[test]
    fn test_render_with_repo_url_and_authors() {
        let config = RenderConfig {
            repo_url: Some("https://github.com/test/repo/".to_string()),
            include_authors: true,
            ..RenderConfig::default()
        };
        let output = MarkdownRenderer::new(config).render(&fixtures::document()).unwrap();

        assert!(output.contains("[aaaaaaa](https://github.com/test/repo/commit/aaaaaaa1111)"));
        assert!(output.contains(" - Ada, Linus\n"));
    }

    #[test]
    fn test_render_without_hashes() {
        let config = RenderConfig {
            include_hashes: false,
            ..RenderConfig::default()
        };
        let output = MarkdownRenderer::new(config).render(&fixtures::document()).unwrap();
        assert!(!output.contains("aaaaaaa"));
    }

    #[test]
    fn test_summary_paragraph() {
        let doc = fixtures::document().with_summary(NarrativeSummary {
            text: "This release adds OAuth2.".to_string(),
            provider: "ollama".to_string(),
            model: "m".to_string(),
        });
        let output = MarkdownRenderer::default().render(&doc).unwrap();
        assert!(output.contains("commits._\n\nThis release adds OAuth2.\n\n### ⚠ BREAKING"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = MarkdownRenderer::default();
        let doc = fixtures::document();
        assert_eq!(renderer.render(&doc).unwrap(), renderer.render(&doc).unwrap());
    }
}
