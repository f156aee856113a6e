//! Atlas Bridge - run catalog tasks from the command line
//!
//! Each invocation runs exactly one catalog task and prints what the task
//! published as JSON on stdout. Logs go to stderr and a daily JSON log file.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{connections, create, run, search};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Atlas Bridge - push lineage metadata into an Atlas catalog
#[derive(Parser)]
#[command(name = "atlas-bridge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Connection registry file (default: <config dir>/connections.yaml)
    #[arg(long, global = true, env = "ATLAS_BRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Connection identifier to use
    #[arg(short, long, global = true, env = "ATLAS_BRIDGE_CONNECTION")]
    pub connection: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register type definitions from a JSON file
    CreateTypedefs(create::CreateArgs),

    /// Upsert exactly one entity from a JSON file
    CreateEntity(create::CreateArgs),

    /// Upsert a batch of entities from a JSON file
    CreateEntities(create::CreateArgs),

    /// Search entities by attribute predicates
    SearchAttributes(search::SearchAttributesArgs),

    /// Search entities with a DSL query
    SearchDsl(search::SearchDslArgs),

    /// Run a task definition file (TOML or JSON)
    Run(run::RunArgs),

    /// List configured connections
    Connections(connections::ConnectionsArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console logs on stderr keep stdout clean for the published JSON
    let filter = if cli.verbose {
        "atlas_bridge=debug,atlas_tasks=debug,atlas_client=debug,atlas_config=debug,info"
    } else {
        "atlas_bridge=info,atlas_tasks=info,atlas_client=warn,atlas_config=warn,warn"
    };

    let log_dir = atlas_config::xdg_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "atlas-bridge.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "atlas_bridge=trace,atlas_tasks=trace,atlas_client=trace,atlas_config=trace,info",
                )),
        )
        .init();

    let ctx = commands::Context {
        config_path: cli.config,
        connection: cli.connection,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::CreateTypedefs(args) => create::run_typedefs(args, &ctx),
        Commands::CreateEntity(args) => create::run_entity(args, &ctx),
        Commands::CreateEntities(args) => create::run_entities(args, &ctx),
        Commands::SearchAttributes(args) => search::run_attributes(args, &ctx),
        Commands::SearchDsl(args) => search::run_dsl(args, &ctx),
        Commands::Run(args) => run::run(args, &ctx),
        Commands::Connections(args) => connections::run(args, &ctx),
    }
}
