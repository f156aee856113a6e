//! Run command - execute a task definition file.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use atlas_tasks::CatalogTask;
use clap::Args;

use super::Context;

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Task definition file (.toml or .json)
    pub task_file: PathBuf,
}

/// Run the task file. `--connection` overrides the file's `connection_id`.
pub fn run(args: RunArgs, ctx: &Context) -> Result<()> {
    let mut task = CatalogTask::from_file(&args.task_file)
        .with_context(|| format!("Failed to load task {}", args.task_file.display()))?;
    if let Some(connection) = &ctx.connection {
        task.connection_id = connection.clone();
    }
    let registry = ctx.registry()?;
    ctx.execute(registry, &task)
}
