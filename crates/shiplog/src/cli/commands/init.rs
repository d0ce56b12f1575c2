//! Init command

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use console::style;
use tracing::info;

use shiplog_core::config::{Config, DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_TOML, DEFAULT_CONFIG_YAML};

use crate::cli::{output, Cli};

/// Configuration file syntax
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ConfigSyntax {
    #[default]
    Yaml,
    Toml,
}

/// Write a starter configuration file
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Overwrite an existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Configuration syntax
    #[arg(long, value_enum, default_value_t = ConfigSyntax::Yaml)]
    pub syntax: ConfigSyntax,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, syntax = ?self.syntax, "executing init command");
        let cwd = std::env::current_dir()?;
        let default_name = match self.syntax {
            ConfigSyntax::Yaml => DEFAULT_CONFIG_YAML,
            ConfigSyntax::Toml => DEFAULT_CONFIG_TOML,
        };
        let config_path = self.output.clone().unwrap_or_else(|| cwd.join(default_name));

        if config_path.exists() && !self.force {
            anyhow::bail!(
                "Configuration file already exists at {}. Use --force to overwrite.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, render_template(self.syntax)?)?;

        if !cli.quiet {
            output::success(&format!(
                "Created configuration at {}",
                style(config_path.display()).cyan()
            ));
            eprintln!();
            eprintln!("Next steps:");
            eprintln!("  1. Edit {} to adjust sections and breaking-change rules", config_path.display());
            eprintln!("  2. Run {} to verify it", style("shiplog config validate").cyan());
            eprintln!("  3. Run {} to produce a changelog", style("shiplog generate").cyan());
        }

        Ok(())
    }
}

/// Template text in the requested syntax
fn render_template(syntax: ConfigSyntax) -> anyhow::Result<String> {
    match syntax {
        ConfigSyntax::Yaml => Ok(DEFAULT_CONFIG_TEMPLATE.to_string()),
        ConfigSyntax::Toml => {
            let config: Config = serde_yaml::from_str(DEFAULT_CONFIG_TEMPLATE)?;
            Ok(toml::to_string_pretty(&config)?)
        }
    }
}
