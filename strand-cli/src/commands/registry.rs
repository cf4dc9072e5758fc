//! Registry command handlers
//!
//! Handles docker registry registration and listing.

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use strand_core::domain::registry::DockerRegistry;
use strand_core::dto::registry::CreateRegistry;

use crate::commands::client;
use crate::config::Config;

/// Registry subcommands
#[derive(Subcommand)]
pub enum RegistryCommands {
    /// Register a docker registry
    Create {
        /// Registry host path, e.g. registry.example.com:5000
        path: String,

        /// Alternative host notifications may arrive under
        #[arg(long)]
        external_url: Option<String>,

        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List all registries
    List,
}

/// Handle registry commands
pub async fn handle_registry_command(command: RegistryCommands, config: &Config) -> Result<()> {
    let client = client(config);

    match command {
        RegistryCommands::Create {
            path,
            external_url,
            description,
        } => {
            let registry = client
                .create_registry(CreateRegistry {
                    path,
                    description,
                    external_url,
                })
                .await?;

            println!(
                "{} Registry {} registered as {}",
                "✓".green(),
                registry.path.bold(),
                registry.id.to_string().dimmed()
            );
            Ok(())
        }
        RegistryCommands::List => {
            let registries = client.list_registries().await?;

            if registries.is_empty() {
                println!("{}", "No registries found.".yellow());
            } else {
                println!(
                    "{}",
                    format!("Found {} registr(y/ies):", registries.len()).bold()
                );
                println!();
                for registry in registries {
                    print_registry_summary(&registry);
                }
            }
            Ok(())
        }
    }
}

/// Print a registry summary
fn print_registry_summary(registry: &DockerRegistry) {
    println!(
        "  {} {} {}",
        "▸".cyan(),
        registry.path.bold(),
        registry.id.to_string().dimmed()
    );
    if let Some(external_url) = &registry.external_url {
        println!("    External: {}", external_url.dimmed());
    }
    println!("    Owner:    {}", registry.owner.dimmed());
    println!();
}
