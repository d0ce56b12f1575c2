//! Providers command

use clap::{Args, Subcommand};
use console::style;
use tracing::info;

use shiplog_ai::build_provider;
use shiplog_ai::providers::resolve_api_key;
use shiplog_core::config::{load_config_or_default, AiConfig, ProviderKind};

use crate::cli::{output, Cli};

/// List or check text-generation backends
#[derive(Debug, Args)]
pub struct ProvidersCommand {
    #[command(subcommand)]
    pub action: ProvidersAction,
}

#[derive(Debug, Subcommand)]
pub enum ProvidersAction {
    /// List supported backends
    List,

    /// Check that a backend is reachable
    Test {
        /// Backend to check (default: the configured one)
        #[arg(long, env = "SHIPLOG_AI_PROVIDER")]
        provider: Option<String>,

        /// Model to check for
        #[arg(long, env = "SHIPLOG_AI_MODEL")]
        model: Option<String>,
    },
}

impl ProvidersCommand {
    /// Execute the providers command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let cwd = std::env::current_dir()?;
        let (config, _) = load_config_or_default(&cwd)?;

        match &self.action {
            ProvidersAction::List => {
                info!("executing providers list");
                let configured = config.ai.provider_kind().ok();
                println!("{}", output::header("Text-generation providers"));
                for kind in ProviderKind::ALL {
                    let marker = if Some(kind) == configured {
                        style("*").green().bold().to_string()
                    } else {
                        " ".to_string()
                    };
                    let key = match kind.api_key_env() {
                        None => "no key needed".to_string(),
                        Some(var) => {
                            let lookup = AiConfig {
                                api_key: config.ai.api_key.clone().filter(|_| Some(kind) == configured),
                                ..AiConfig::default()
                            };
                            if resolve_api_key(&lookup, kind).is_some() {
                                format!("{} set", var)
                            } else {
                                format!("{} missing", var)
                            }
                        }
                    };
                    println!(
                        "{} {:<10} default model {} {}",
                        marker,
                        kind.to_string(),
                        style(format!("{:<26}", kind.default_model())).cyan(),
                        style(key).dim()
                    );
                }
            }
            ProvidersAction::Test { provider, model } => {
                let ai = override_backend(config.ai, provider.as_deref(), model.as_deref());
                info!(provider = %ai.provider, "executing providers test");

                let backend = build_provider(&ai)?;
                let runtime = tokio::runtime::Runtime::new()?;
                let reachable = runtime.block_on(backend.check_connectivity());

                if !reachable {
                    anyhow::bail!(
                        "{} is not reachable with model {}",
                        backend.name(),
                        backend.model()
                    );
                }
                if !cli.quiet {
                    output::success(&format!(
                        "{} is reachable (model {})",
                        style(backend.name()).cyan(),
                        backend.model()
                    ));
                }
            }
        }
        Ok(())
    }
}

fn override_backend(mut ai: AiConfig, provider: Option<&str>, model: Option<&str>) -> AiConfig {
    if let Some(provider) = provider {
        ai.provider = provider.to_string();
        ai.model.clear();
        ai.api_key = None;
    }
    if let Some(model) = model {
        ai.model = model.to_string();
    }
    ai
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_backend() {
        let base = AiConfig {
            api_key: Some("sk-ollama-irrelevant".to_string()),
            ..AiConfig::default()
        };

        let ai = override_backend(base.clone(), None, None);
        assert_eq!(ai, base);

        let ai = override_backend(base.clone(), Some("grok"), None);
        assert_eq!(ai.model_name().unwrap(), "grok-2");
        assert!(ai.api_key.is_none());

        let ai = override_backend(base, Some("anthropic"), Some("claude-3-opus-latest"));
        assert_eq!(ai.model_name().unwrap(), "claude-3-opus-latest");
    }
}
