//! Pipeline command handlers
//!
//! Handles all pipeline-related CLI commands.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use strand_core::domain::pipeline::Pipeline;
use strand_core::dto::pipeline::CreatePipeline;
use uuid::Uuid;

use crate::commands::client;
use crate::config::Config;

/// Pipeline subcommands
#[derive(Subcommand)]
pub enum PipelineCommands {
    /// Create a new pipeline
    Create {
        /// Pipeline name
        name: String,

        /// Docker image the pipeline runs
        #[arg(short, long)]
        image: String,

        /// Optional description
        #[arg(short, long)]
        description: Option<String>,

        /// Tags
        #[arg(short, long)]
        tag: Vec<String>,
    },
    /// List all pipelines
    List,
    /// Get pipeline details
    Get {
        /// Pipeline ID
        id: String,
    },
    /// Delete a pipeline
    Delete {
        /// Pipeline ID
        id: String,
    },
}

/// Handle pipeline commands
///
/// Routes pipeline subcommands to their respective handlers.
pub async fn handle_pipeline_command(command: PipelineCommands, config: &Config) -> Result<()> {
    let client = client(config);

    match command {
        PipelineCommands::Create {
            name,
            image,
            description,
            tag,
        } => {
            let pipeline = client
                .create_pipeline(CreatePipeline {
                    name,
                    description,
                    docker_image: image,
                    tags: tag,
                    config: None,
                })
                .await?;

            println!("{}", "Pipeline created:".bold());
            print_pipeline_details(&pipeline);
            Ok(())
        }
        PipelineCommands::List => {
            let pipelines = client.list_pipelines().await?;

            if pipelines.is_empty() {
                println!("{}", "No pipelines found.".yellow());
            } else {
                println!("{}", format!("Found {} pipeline(s):", pipelines.len()).bold());
                println!();
                for pipeline in pipelines {
                    print_pipeline_summary(&pipeline);
                }
            }
            Ok(())
        }
        PipelineCommands::Get { id } => {
            let pipeline = client.get_pipeline(parse_id(&id)?).await?;
            print_pipeline_details(&pipeline);
            Ok(())
        }
        PipelineCommands::Delete { id } => {
            let id = parse_id(&id)?;
            client.delete_pipeline(id).await?;
            println!("{} Pipeline {} deleted", "✓".green(), id);
            Ok(())
        }
    }
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).with_context(|| format!("Invalid ID: {}", id))
}

/// Print a pipeline summary
fn print_pipeline_summary(pipeline: &Pipeline) {
    println!(
        "  {} {} {}",
        "▸".cyan(),
        pipeline.name.bold(),
        pipeline.id.to_string().dimmed()
    );
    println!("    Image:   {}", pipeline.docker_image.dimmed());
    if !pipeline.tags.is_empty() {
        println!("    Tags:    {}", pipeline.tags.join(", ").dimmed());
    }
    println!();
}

/// Print detailed pipeline information
fn print_pipeline_details(pipeline: &Pipeline) {
    println!("{}", "Pipeline Details:".bold());
    println!("  ID:          {}", pipeline.id.to_string().cyan());
    println!("  Name:        {}", pipeline.name);
    if let Some(description) = &pipeline.description {
        println!("  Description: {}", description);
    }
    println!("  Image:       {}", pipeline.docker_image);
    println!(
        "  Created:     {}",
        pipeline.created_at.format("%Y-%m-%d %H:%M:%S")
    );

    if !pipeline.tags.is_empty() {
        println!("  Tags:        {}", pipeline.tags.join(", "));
    }

    if !pipeline.config.env_vars.is_empty() {
        println!("\n{}", "Environment:".bold());
        for (name, value) in &pipeline.config.env_vars {
            println!("  {} = {}", name.cyan(), value);
        }
    }
}
