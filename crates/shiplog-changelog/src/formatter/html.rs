//! HTML changelog renderer

use shiplog_core::config::{OutputFormat, RenderConfig};
use shiplog_core::Result;
use tracing::{debug, instrument};

use super::{authors, short_id, timestamp, ChangelogRenderer};
use crate::types::ChangelogDocument;

const STYLE: &str = "body{font-family:-apple-system,BlinkMacSystemFont,\"Segoe UI\",sans-serif;max-width:52rem;margin:2rem auto;padding:0 1rem;color:#1f2328;line-height:1.5}\
h1{border-bottom:1px solid #d0d7de;padding-bottom:.3rem}\
.meta{color:#656d76;font-size:.9rem}\
.summary{background:#f6f8fa;border-left:4px solid #0969da;padding:.5rem 1rem}\
.breaking{border-left:4px solid #cf222e;padding-left:1rem}\
.flag{color:#cf222e;font-weight:600}\
.scope{font-weight:600}\
code{font-size:.85rem;color:#656d76}";

/// Escape text for element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Self-contained HTML page renderer
pub struct HtmlRenderer {
    config: RenderConfig,
}

impl HtmlRenderer {
    /// Create a new HTML renderer
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    fn hashes<'a>(&self, ids: impl Iterator<Item = &'a str>) -> String {
        if !self.config.include_hashes {
            return String::new();
        }
        let links: Vec<String> = ids
            .map(|id| {
                let short = escape_html(short_id(id));
                match &self.config.repo_url {
                    Some(url) => format!(
                        "<a href=\"{}/commit/{}\"><code>{}</code></a>",
                        escape_html(url.trim_end_matches('/')),
                        escape_html(id),
                        short
                    ),
                    None => format!("<code>{}</code>", short),
                }
            })
            .collect();
        if links.is_empty() {
            String::new()
        } else {
            format!(" ({})", links.join(", "))
        }
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl ChangelogRenderer for HtmlRenderer {
    #[instrument(skip(self, document), fields(range = %document.metadata.range, section_count = document.sections.len()))]
    fn render(&self, document: &ChangelogDocument) -> Result<String> {
        let meta = &document.metadata;
        let title = escape_html(&self.config.title);
        let range = escape_html(&meta.range);

        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{} - {}</title>\n", title, range));
        out.push_str(&format!("<style>{}</style>\n</head>\n<body>\n", STYLE));
        out.push_str(&format!("<h1>{}</h1>\n<h2>{}</h2>\n", title, range));
        out.push_str(&format!(
            "<p class=\"meta\">Generated <time datetime=\"{ts}\">{ts}</time> from {} commit{}.</p>\n",
            meta.total_commits,
            if meta.total_commits == 1 { "" } else { "s" },
            ts = timestamp(&meta.generated_at),
        ));

        if let Some(summary) = &document.summary {
            out.push_str(&format!(
                "<p class=\"summary\">{}</p>\n",
                escape_html(summary.text.trim())
            ));
        }

        if !document.breaking_changes.is_empty() {
            out.push_str("<section class=\"breaking\">\n<h3>⚠ Breaking Changes</h3>\n<ul>\n");
            for change in &document.breaking_changes {
                out.push_str(&format!(
                    "<li>{}{}</li>\n",
                    escape_html(&change.description),
                    self.hashes(change.commits.iter().map(String::as_str))
                ));
            }
            out.push_str("</ul>\n</section>\n");
        }

        for section in document.visible_sections(self.config.show_hidden) {
            out.push_str(&format!(
                "<section>\n<h3>{}</h3>\n<ul>\n",
                escape_html(&section.title)
            ));
            for entry in &section.entries {
                out.push_str("<li>");
                if entry.breaking {
                    out.push_str("<span class=\"flag\">⚠</span> ");
                }
                if let Some(scope) = &entry.scope {
                    out.push_str(&format!("<span class=\"scope\">{}:</span> ", escape_html(scope)));
                }
                out.push_str(&escape_html(&entry.description));
                out.push_str(&self.hashes(entry.commits.iter().map(|c| c.id.as_str())));
                if self.config.include_authors {
                    out.push_str(&format!(
                        " <span class=\"author\">{}</span>",
                        escape_html(&authors(&entry.commits).join(", "))
                    ));
                }
                out.push_str("</li>\n");
            }
            out.push_str("</ul>\n</section>\n");
        }

        out.push_str("</body>\n</html>\n");
        debug!(output_len = out.len(), "html changelog rendered");
        Ok(out)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::fixtures;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & 'Jerry'</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_is_self_contained() {
        let output = HtmlRenderer::default().render(&fixtures::document()).unwrap();
        assert!(output.starts_with("<!DOCTYPE html>"));
        assert!(output.contains("<style>"));
        assert!(!output.contains("<link"));
        assert!(!output.contains("<script"));
        assert!(output.ends_with("</html>\n"));
    }

    #[test]
    fn test_commit_text_is_escaped() {
        let output = HtmlRenderer::default().render(&fixtures::document()).unwrap();
        assert!(output.contains("escape &lt;script&gt; &amp; &quot;quotes&quot;"));
    }

    #[test]
    fn test_sections_and_breaking_block() {
        let output = HtmlRenderer::default().render(&fixtures::document()).unwrap();
        assert!(output.contains("<h3>Features</h3>"));
        assert!(output.contains("<h3>Bug Fixes</h3>"));
        assert!(!output.contains("<h3>Chores</h3>"));
        assert!(output.contains("<span class=\"scope\">auth:</span> add OAuth2 support"));
        let breaking = output.find("Breaking Changes").unwrap();
        assert!(breaking < output.find("<h3>Features</h3>").unwrap());
    }

    #[test]
    fn test_commit_links() {
        let config = RenderConfig {
            repo_url: Some("https://example.com/r".to_string()),
            ..RenderConfig::default()
        };
        let output = HtmlRenderer::new(config).render(&fixtures::document()).unwrap();
        assert!(output.contains(
            "<a href=\"https://example.com/r/commit/aaaaaaa1111\"><code>aaaaaaa</code></a>"
        ));
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = HtmlRenderer::default();
        let doc = fixtures::document();
        assert_eq!(renderer.render(&doc).unwrap(), renderer.render(&doc).unwrap());
    }
}
