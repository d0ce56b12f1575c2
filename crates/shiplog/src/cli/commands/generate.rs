//! Generate command

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Args;
use console::style;
use tracing::info;

use shiplog_ai::{EnhancementReport, Enhancer, StepOutcome};
use shiplog_changelog::{ChangelogGenerator, RendererRegistry};
use shiplog_core::config::{load_config_or_default, validate_config, Config, OutputFormat};
use shiplog_core::{ConfigError, GitError, RunContext};
use shiplog_git::{CommitRange, GitRepo};

use crate::cli::{output, Cli};

/// Generate a changelog for a commit range
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Commit range such as `v1.0.0..HEAD` (default: latest tag to HEAD)
    pub range: Option<String>,

    /// Output file (default: print to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format: markdown, html or json (default: from the output extension)
    #[arg(short, long, env = "SHIPLOG_FORMAT")]
    pub format: Option<String>,

    /// Text-generation backend
    #[arg(long, env = "SHIPLOG_AI_PROVIDER")]
    pub provider: Option<String>,

    /// Model for the text-generation backend
    #[arg(long, env = "SHIPLOG_AI_MODEL")]
    pub model: Option<String>,

    /// Add a generated narrative summary
    #[arg(
        long,
        env = "SHIPLOG_AI_ENABLED",
        num_args = 0..=1,
        default_missing_value = "true",
        conflicts_with = "no_ai"
    )]
    pub ai: Option<bool>,

    /// Never call a text-generation backend
    #[arg(long)]
    pub no_ai: bool,

    /// Render sections marked hidden
    #[arg(long)]
    pub show_hidden: bool,
}

impl GenerateCommand {
    /// Execute the generate command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(range = ?self.range, output = ?self.output, "executing generate command");
        let cwd = std::env::current_dir()?;
        let (mut config, config_path) = load_config_or_default(&cwd)?;
        if let Some(path) = &config_path {
            info!(path = %path.display(), "using configuration");
        }

        self.apply_overrides(&mut config);
        validate_config(&config)?;
        let format = self.resolve_format(&config)?;

        let repo = GitRepo::discover(&cwd)?;
        let range = match &self.range {
            Some(expr) => CommitRange::parse(expr)?,
            None => match repo.latest_tag()? {
                Some(tag) => CommitRange::since(tag),
                None => CommitRange::all(),
            },
        };
        let label = range.to_string();
        let ctx = RunContext::new(&label);

        let generator = ChangelogGenerator::new(&config)?;
        let commits = repo
            .commits_in_range(&range, |path| generator.detector().is_version_file(path))
            .with_context(|| format!("reading commits in {}", label))?;

        if commits.is_empty() {
            if config.generate.require_commits {
                return Err(GitError::NoCommits(label).into());
            }
            if !cli.quiet {
                output::warning(&format!("No commits found in {}", label));
            }
        }

        let document = generator.generate(&commits, &label, Utc::now(), &ctx);

        let enhancer = Enhancer::from_config(&config.ai, &ctx)?;
        let (document, report) = if enhancer.is_enabled() {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(enhancer.enhance(document, &ctx))?
        } else {
            (document, EnhancementReport::skipped())
        };

        let renderer = RendererRegistry::new(&config.render).get(format)?;
        let rendered = renderer.render(&document)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, &rendered)
                    .with_context(|| format!("writing {}", path.display()))?;
                if !cli.quiet {
                    output::success(&format!(
                        "Changelog for {} written to {} ({} commits, {} breaking)",
                        style(&label).yellow(),
                        style(path.display()).cyan(),
                        document.metadata.total_commits,
                        document.breaking_changes.len()
                    ));
                }
            }
            None => print!("{}", rendered),
        }

        if !cli.quiet {
            print_report(&report);
            let diagnostics = ctx.diagnostics();
            if !diagnostics.is_empty() {
                eprintln!();
                eprintln!("{}", output::header("Diagnostics"));
                for diagnostic in &diagnostics {
                    eprintln!("  {}", output::diagnostic_line(diagnostic));
                }
            }
        }

        Ok(())
    }

    /// Fold command-line and environment overrides into the configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(provider) = &self.provider {
            config.ai.provider = provider.clone();
            // the configured model belongs to the configured provider
            if self.model.is_none() {
                config.ai.model.clear();
            }
        }
        if let Some(model) = &self.model {
            config.ai.model = model.clone();
        }
        if let Some(enabled) = self.ai {
            config.ai.enabled = enabled;
        }
        if self.no_ai {
            config.ai.enabled = false;
        }
        if self.show_hidden {
            config.render.show_hidden = true;
        }
    }

    /// `--format`, else the output file extension, else `render.format`
    fn resolve_format(&self, config: &Config) -> Result<OutputFormat, ConfigError> {
        match (&self.format, &self.output) {
            (Some(name), _) => name.parse(),
            (None, Some(path)) => Ok(OutputFormat::from_path(path)),
            (None, None) => config.render.output_format(),
        }
    }
}

fn print_report(report: &EnhancementReport) {
    let Some(provider) = &report.provider else {
        return;
    };

    match &report.summary {
        StepOutcome::Succeeded => output::info(&format!(
            "Summary generated by {} ({})",
            provider,
            report.model.as_deref().unwrap_or("default model")
        )),
        StepOutcome::Failed(reason) => {
            output::warning(&format!("Summary skipped, {} failed: {}", provider, reason))
        }
        StepOutcome::Skipped => {}
    }

    if let StepOutcome::Failed(reason) = &report.review {
        output::warning(&format!("Breaking-change review failed: {}", reason));
    }

    if let Some(findings) = &report.findings {
        eprintln!();
        eprintln!("{}", output::header("Breaking-change review"));
        for (label, items) in [
            ("confirmed", &findings.confirmed),
            ("disputed", &findings.disputed),
            ("possibly missed", &findings.additional),
        ] {
            for item in items {
                eprintln!("{}", output::key_value(label, item));
            }
        }
        if findings.is_empty() {
            eprintln!("  {}", style("no remarks").dim());
        }
    }
}
