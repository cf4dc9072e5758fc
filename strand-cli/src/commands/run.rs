//! Run command handlers
//!
//! Handles all run-related CLI commands including launching, listing,
//! lifecycle transitions and disk attachment.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use strand_core::domain::run::{Run, RunParameter, RunStatus};
use strand_core::dto::run::{LaunchRun, RunDto};
use uuid::Uuid;

use crate::commands::client;
use crate::config::Config;

/// Run subcommands
#[derive(Subcommand)]
pub enum RunCommands {
    /// Launch a run from a pipeline
    Launch {
        /// Pipeline ID
        pipeline_id: String,

        /// Run parameters as NAME=VALUE pairs
        #[arg(short, long)]
        param: Vec<String>,
    },
    /// List all runs
    List,
    /// Get run details
    Get {
        /// Run ID
        id: String,
    },
    /// Terminate a paused run
    Terminate {
        /// Run ID
        id: String,
    },
    /// Pause a running run
    Pause {
        /// Run ID
        id: String,
    },
    /// Resume a paused run
    Resume {
        /// Run ID
        id: String,
    },
    /// Attach a disk to a live run
    AttachDisk {
        /// Run ID
        id: String,

        /// Disk size in GB
        #[arg(short, long)]
        size: i64,
    },
}

/// Handle run commands
///
/// Routes run subcommands to their respective handlers.
pub async fn handle_run_command(command: RunCommands, config: &Config) -> Result<()> {
    let client = client(config);

    match command {
        RunCommands::Launch { pipeline_id, param } => {
            let pipeline_id = parse_id(&pipeline_id)?;
            let parameters = parse_parameters(&param)?;

            let run = client
                .launch_run(LaunchRun {
                    pipeline_id,
                    parameters,
                })
                .await?;

            println!("{}", "Run launched:".bold());
            print_run_details(&run);
            Ok(())
        }
        RunCommands::List => {
            let runs = client.list_runs().await?;

            if runs.is_empty() {
                println!("{}", "No runs found.".yellow());
            } else {
                println!("{}", format!("Found {} run(s):", runs.len()).bold());
                println!();
                for run in runs {
                    print_run_summary(&run);
                }
            }
            Ok(())
        }
        RunCommands::Get { id } => {
            let run = client.get_run(parse_id(&id)?).await?;
            print_run_details(&run);
            Ok(())
        }
        RunCommands::Terminate { id } => {
            let run = client.terminate_run(parse_id(&id)?).await?;
            println!(
                "{} Run {} is now {}",
                "✓".green(),
                run.id,
                colorize_status(&run.status)
            );
            Ok(())
        }
        RunCommands::Pause { id } => {
            let run = client.pause_run(parse_id(&id)?).await?;
            println!(
                "{} Run {} is now {}",
                "✓".green(),
                run.id,
                colorize_status(&run.status)
            );
            Ok(())
        }
        RunCommands::Resume { id } => {
            let run = client.resume_run(parse_id(&id)?).await?;
            println!(
                "{} Run {} is now {}",
                "✓".green(),
                run.id,
                colorize_status(&run.status)
            );
            Ok(())
        }
        RunCommands::AttachDisk { id, size } => {
            let disk = client.attach_disk(parse_id(&id)?, size).await?;
            println!(
                "{} Attached {} GB disk at {} to run {}",
                "✓".green(),
                disk.size,
                disk.device.cyan(),
                disk.run_id
            );
            Ok(())
        }
    }
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).with_context(|| format!("Invalid ID: {}", id))
}

fn parse_parameters(params: &[String]) -> Result<Vec<RunParameter>> {
    params
        .iter()
        .map(|raw| {
            let (name, value) = raw
                .split_once('=')
                .with_context(|| format!("Parameter must be NAME=VALUE, got: {}", raw))?;
            Ok(RunParameter::new(name, value))
        })
        .collect()
}

/// Print a run summary
fn print_run_summary(run: &RunDto) {
    println!("  {} Run {}", "▸".cyan(), run.id.to_string().dimmed());
    if let Some(pipeline_id) = run.pipeline_id {
        println!("    Pipeline: {}", pipeline_id.to_string().dimmed());
    }
    println!("    Status:   {}", colorize_status(&run.status));
    println!("    Image:    {}", run.docker_image.dimmed());
    println!(
        "    Started:  {}",
        run.started_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!();
}

/// Print detailed run information
fn print_run_details(run: &Run) {
    println!("{}", "Run Details:".bold());
    println!("  ID:          {}", run.id.to_string().cyan());
    if let Some(pipeline_id) = run.pipeline_id {
        println!("  Pipeline ID: {}", pipeline_id.to_string().dimmed());
    }
    println!("  Status:      {}", colorize_status(&run.status));
    println!("  Image:       {}", run.docker_image);
    println!("  Owner:       {}", run.owner);
    println!("  Started:     {}", run.started_at.format("%Y-%m-%d %H:%M:%S"));

    if let Some(finished) = run.finished_at {
        println!("  Finished:    {}", finished.format("%Y-%m-%d %H:%M:%S"));

        let duration = finished.signed_duration_since(run.started_at);
        println!("  Duration:    {}s", duration.num_seconds());
    }

    if let Some(instance) = &run.instance {
        println!("  Node:        {}", instance.node_name);
    }

    if !run.parameters.is_empty() {
        println!("\n{}", "Parameters:".bold());
        for param in &run.parameters {
            println!("  {} = {}", param.name.cyan(), param.effective_value());
        }
    }

    if !run.service_urls.is_empty() {
        println!("\n{}", "Service URLs:".bold());
        for (name, url) in &run.service_urls {
            println!("  {} = {}", name.cyan(), url);
        }
    }
}

/// Colorize run status for display
fn colorize_status(status: &RunStatus) -> colored::ColoredString {
    let status_str = format!("{:?}", status);
    match status {
        RunStatus::Running => status_str.cyan(),
        RunStatus::Pausing | RunStatus::Resuming => status_str.yellow(),
        RunStatus::Paused => status_str.dimmed(),
        RunStatus::Stopped => status_str.dimmed(),
        RunStatus::Failure => status_str.red(),
        RunStatus::Success => status_str.green(),
    }
}
