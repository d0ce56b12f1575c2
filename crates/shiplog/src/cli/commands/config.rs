//! Config command

use clap::{Args, Subcommand};
use console::style;
use tracing::info;

use shiplog_core::config::{load_config, load_config_or_default, Config};

use crate::cli::{output, Cli};

/// Inspect the configuration
#[derive(Debug, Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show {
        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// Check a configuration file
    Validate {
        /// File to check (default: the discovered configuration)
        path: Option<std::path::PathBuf>,
    },
}

impl ConfigCommand {
    /// Execute the config command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let cwd = std::env::current_dir()?;
        match &self.action {
            ConfigAction::Show { json } => {
                info!(json, "executing config show");
                let (config, path) = load_config_or_default(&cwd)?;
                if !cli.quiet {
                    match &path {
                        Some(path) => output::info(&format!("Loaded {}", style(path.display()).cyan())),
                        None => output::info("No configuration file found, showing defaults"),
                    }
                }
                let config = redacted(config);
                if *json {
                    println!("{}", serde_json::to_string_pretty(&config)?);
                } else {
                    print!("{}", serde_yaml::to_string(&config)?);
                }
            }
            ConfigAction::Validate { path } => {
                info!(path = ?path, "executing config validate");
                let path = match path {
                    Some(path) => Some(path.clone()),
                    None => load_config_or_default(&cwd)?.1,
                };
                match path {
                    Some(path) => {
                        load_config(&path)?;
                        if !cli.quiet {
                            output::success(&format!(
                                "{} is valid",
                                style(path.display()).cyan()
                            ));
                        }
                    }
                    None => {
                        if !cli.quiet {
                            output::warning("No configuration file found; defaults apply");
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Hide secrets before printing
fn redacted(mut config: Config) -> Config {
    if config.ai.api_key.is_some() {
        config.ai.api_key = Some("********".to_string());
    }
    config
}
