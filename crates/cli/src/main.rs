// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! cg - CI build graph CLI

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{artifacts, job, pipeline, project, queue, runner, Context};
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cg",
    version,
    about = "cg - CI build graph and status aggregation"
)]
struct Cli {
    /// State directory holding the WAL, artifacts and secrets
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project management
    Project(project::ProjectArgs),
    /// Create and inspect pipelines
    Pipeline(pipeline::PipelineArgs),
    /// Drive and inspect individual builds
    Job(job::JobArgs),
    /// Runner registration
    Runner(runner::RunnerArgs),
    /// Dispatch queue
    Queue(queue::QueueArgs),
    /// Build artifacts
    Artifacts(artifacts::ArtifactsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();

    let config_path = cli.config.or_else(default_config_path);
    let config = match &config_path {
        Some(path) => cg_core::Config::load_or_default(path)?,
        None => cg_core::Config::default(),
    };
    let state_dir = cli.state.unwrap_or_else(default_state_dir);
    let mut ctx = Context::open(&state_dir, config, cli.format)?;

    match cli.command {
        Commands::Project(args) => project::handle(args.command, &mut ctx),
        Commands::Pipeline(args) => pipeline::handle(args.command, &mut ctx).await,
        Commands::Job(args) => job::handle(args.command, &mut ctx).await,
        Commands::Runner(args) => runner::handle(args.command, &mut ctx),
        Commands::Queue(args) => queue::handle(args.command, &mut ctx).await,
        Commands::Artifacts(args) => artifacts::handle(args.command, &mut ctx).await,
    }
}

/// Log to stderr, filtered by `CG_LOG` (default: warn)
fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_env("CG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cg").join("config.toml"))
}

fn default_state_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("cg"))
        .unwrap_or_else(|| PathBuf::from(".cg"))
}
