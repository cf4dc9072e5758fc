//! Strand CLI
//!
//! Command-line interface for interacting with the Strand orchestrator.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "strand")]
#[command(about = "Strand pipeline platform CLI", long_about = None)]
struct Cli {
    /// Orchestrator URL
    #[arg(
        long,
        env = "STRAND_ORCHESTRATOR_URL",
        default_value = "http://localhost:8080"
    )]
    orchestrator_url: String,

    /// Identity sent with every request
    #[arg(long, env = "STRAND_USER", default_value = "anonymous")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        orchestrator_url: cli.orchestrator_url,
        user: cli.user,
    };

    handle_command(cli.command, &config).await
}
