//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod pipeline;
mod registry;
mod run;

pub use pipeline::PipelineCommands;
pub use registry::RegistryCommands;
pub use run::RunCommands;

use anyhow::Result;
use clap::Subcommand;
use strand_client::ApiClient;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Pipeline management
    Pipeline {
        #[command(subcommand)]
        command: PipelineCommands,
    },
    /// Run management
    Run {
        #[command(subcommand)]
        command: RunCommands,
    },
    /// Docker registry management
    Registry {
        #[command(subcommand)]
        command: RegistryCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Pipeline { command } => pipeline::handle_pipeline_command(command, config).await,
        Commands::Run { command } => run::handle_run_command(command, config).await,
        Commands::Registry { command } => registry::handle_registry_command(command, config).await,
    }
}

/// Build an API client from the CLI configuration
pub(crate) fn client(config: &Config) -> ApiClient {
    ApiClient::new(&config.orchestrator_url).as_user(&config.user)
}
