//! Configuration validation
//!
//! Runs before any commit is processed so that batch-level mistakes (bad
//! format name, broken type table, uncompilable patterns) are reported
//! immediately.

use std::collections::HashSet;

use globset::Glob;
use regex::Regex;
use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_changelog(config)?;
    validate_breaking(config)?;
    validate_ai(config)?;
    validate_render(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_changelog(config: &Config) -> Result<()> {
    let changelog = &config.changelog;

    if changelog.sections.is_empty() {
        return Err(ConfigError::invalid("changelog.sections", "at least one section is required").into());
    }

    let mut seen = HashSet::new();
    for (i, section) in changelog.sections.iter().enumerate() {
        let tag = section.commit_type.trim().to_lowercase();
        if tag.is_empty() {
            return Err(ConfigError::invalid(
                format!("changelog.sections[{}].type", i),
                "type cannot be empty",
            )
            .into());
        }
        if section.title.trim().is_empty() {
            return Err(ConfigError::invalid(
                format!("changelog.sections[{}].title", i),
                "title cannot be empty",
            )
            .into());
        }
        for name in std::iter::once(&tag).chain(section.aliases.iter()) {
            if !seen.insert(name.to_lowercase()) {
                return Err(ConfigError::invalid(
                    format!("changelog.sections[{}]", i),
                    format!("type or alias '{}' is mapped more than once", name),
                )
                .into());
            }
        }
    }

    if changelog.fallback_type.trim().is_empty() {
        return Err(ConfigError::invalid("changelog.fallback_type", "cannot be empty").into());
    }
    if seen.contains(&changelog.fallback_type.to_lowercase()) {
        return Err(ConfigError::invalid(
            "changelog.fallback_type",
            "must not be one of the configured section types",
        )
        .into());
    }
    if changelog.fallback_title.trim().is_empty() {
        return Err(ConfigError::invalid("changelog.fallback_title", "cannot be empty").into());
    }

    for (i, pattern) in changelog.ignore_patterns.iter().enumerate() {
        Regex::new(pattern).map_err(|e| {
            ConfigError::invalid(format!("changelog.ignore_patterns[{}]", i), e.to_string())
        })?;
    }

    Ok(())
}

fn validate_breaking(config: &Config) -> Result<()> {
    let breaking = &config.breaking;

    for (i, keyword) in breaking.keywords.iter().enumerate() {
        if keyword.trim().is_empty() {
            return Err(ConfigError::invalid(
                format!("breaking.keywords[{}]", i),
                "keyword cannot be empty",
            )
            .into());
        }
    }

    for (field, globs) in [
        ("breaking.public_interface_globs", &breaking.public_interface_globs),
        ("breaking.version_files", &breaking.version_files),
    ] {
        for (i, glob) in globs.iter().enumerate() {
            Glob::new(glob)
                .map_err(|e| ConfigError::invalid(format!("{}[{}]", field, i), e.to_string()))?;
        }
    }

    Ok(())
}

fn validate_ai(config: &Config) -> Result<()> {
    let ai = &config.ai;

    // checked even when disabled
    ai.provider_kind()?;

    if ai.max_attempts == 0 {
        return Err(ConfigError::invalid("ai.max_attempts", "must be at least 1").into());
    }
    if ai.timeout_secs == 0 {
        return Err(ConfigError::invalid("ai.timeout_secs", "must be at least 1").into());
    }
    if ai.max_delay_ms < ai.base_delay_ms {
        return Err(ConfigError::invalid(
            "ai.max_delay_ms",
            "must not be smaller than ai.base_delay_ms",
        )
        .into());
    }
    if ai.max_tokens == 0 {
        return Err(ConfigError::invalid("ai.max_tokens", "must be at least 1").into());
    }

    Ok(())
}

fn validate_render(config: &Config) -> Result<()> {
    config.render.output_format()?;
    Ok(())
}
