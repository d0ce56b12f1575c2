//! Default configuration values

use super::types::{
    AiConfig, BreakingConfig, ChangelogConfig, Config, RenderConfig, SectionConfig,
};

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "shiplog.yaml";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "shiplog.toml";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".shiplog.yaml";

/// Legacy configuration file name still honoured
pub const LEGACY_CONFIG_FILE: &str = ".changelog.yaml";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_YAML,
        DEFAULT_CONFIG_TOML,
        ALT_CONFIG_FILE,
        ".shiplog.toml",
        LEGACY_CONFIG_FILE,
    ]
}

/// Default breaking-change keywords
pub const DEFAULT_KEYWORDS: &[&str] = &["breaking", "breaking change", "deprecated", "removed"];

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            sections: vec![
                SectionConfig::new("feat", "Features").alias("feature"),
                SectionConfig::new("fix", "Bug Fixes").alias("bugfix"),
                SectionConfig::new("docs", "Documentation").alias("doc"),
                SectionConfig::new("refactor", "Code Refactoring"),
                SectionConfig::new("perf", "Performance Improvements").alias("performance"),
                SectionConfig::new("test", "Tests").alias("tests"),
                SectionConfig::new("chore", "Chores"),
            ],
            fallback_type: "other".to_string(),
            fallback_title: "Other".to_string(),
            ignore_patterns: Vec::new(),
        }
    }
}

impl Default for BreakingConfig {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            public_interface_globs: vec![
                "**/api/**".to_string(),
                "**/*.proto".to_string(),
                "**/include/**".to_string(),
                "src/lib.rs".to_string(),
                "**/*.d.ts".to_string(),
            ],
            version_files: vec![
                "Cargo.toml".to_string(),
                "package.json".to_string(),
                "pyproject.toml".to_string(),
                "VERSION".to_string(),
            ],
            non_breaking_tokens: vec!["Non-Breaking".to_string(), "Not-Breaking".to_string()],
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            required: false,
            provider: "ollama".to_string(),
            model: "qwen2.5:14b".to_string(),
            base_url: None,
            api_key: None,
            max_tokens: 2048,
            timeout_secs: 60,
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
            max_samples: 5,
            review_breaking: false,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: "markdown".to_string(),
            title: "Changelog".to_string(),
            include_hashes: true,
            include_authors: false,
            show_hidden: false,
            repo_url: None,
        }
    }
}

/// Generate default configuration YAML
pub fn default_config_yaml() -> String {
    let config = Config::default();
    serde_yaml::to_string(&config).unwrap_or_else(|_| DEFAULT_CONFIG_TEMPLATE.to_string())
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# shiplog configuration

changelog:
  sections:
    - { type: feat, title: Features, aliases: [feature] }
    - { type: fix, title: Bug Fixes, aliases: [bugfix] }
    - { type: docs, title: Documentation, aliases: [doc] }
    - { type: refactor, title: Code Refactoring }
    - { type: perf, title: Performance Improvements, aliases: [performance] }
    - { type: test, title: Tests, aliases: [tests] }
    - { type: chore, title: Chores }
  fallback_type: other
  fallback_title: Other

breaking:
  keywords: [breaking, breaking change, deprecated, removed]
  version_files: [Cargo.toml, package.json, pyproject.toml, VERSION]

ai:
  enabled: false
  provider: ollama
  model: qwen2.5:14b

render:
  format: markdown
  include_hashes: true
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_yaml_round_trips() {
        let yaml = default_config_yaml();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_template_parses() {
        let parsed: Config = serde_yaml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(parsed.changelog.sections.len(), 7);
        assert_eq!(parsed.changelog.sections[0].aliases, vec!["feature"]);
        assert_eq!(parsed.ai.provider, "ollama");
    }
}
