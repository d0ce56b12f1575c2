//! CLI definition and command handling

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use commands::{ConfigCommand, GenerateCommand, InitCommand, ProvidersCommand};

/// Shiplog - changelogs from conventional commits
#[derive(Debug, Parser)]
#[command(name = "shiplog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a changelog for a commit range
    Generate(GenerateCommand),

    /// Write a starter configuration file
    Init(InitCommand),

    /// Inspect the configuration
    Config(ConfigCommand),

    /// List or check text-generation backends
    Providers(ProvidersCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self) -> anyhow::Result<()> {
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match &self.command {
            Commands::Generate(cmd) => cmd.execute(self),
            Commands::Init(cmd) => cmd.execute(self),
            Commands::Config(cmd) => cmd.execute(self),
            Commands::Providers(cmd) => cmd.execute(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "shiplog", "-C", "/tmp", "generate", "v1.0.0..HEAD", "-o", "CHANGES.html", "--ai",
        ])
        .unwrap();
        assert_eq!(cli.directory.as_deref(), Some(std::path::Path::new("/tmp")));
        let Commands::Generate(cmd) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(cmd.range.as_deref(), Some("v1.0.0..HEAD"));
        assert_eq!(cmd.ai, Some(true));
    }

    #[test]
    fn test_parse_nested_commands() {
        let cli = Cli::try_parse_from(["shiplog", "providers", "test", "--provider", "grok"]).unwrap();
        assert!(matches!(cli.command, Commands::Providers(_)));

        let cli = Cli::try_parse_from(["shiplog", "-q", "config", "validate"]).unwrap();
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Config(_)));
    }
}
