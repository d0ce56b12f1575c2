//! CLI commands

mod config;
mod generate;
mod init;
mod providers;

pub use config::ConfigCommand;
pub use generate::GenerateCommand;
pub use init::InitCommand;
pub use providers::ProvidersCommand;
