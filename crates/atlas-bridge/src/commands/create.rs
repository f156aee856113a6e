//! Create commands - register type definitions and upsert entities.

use std::path::PathBuf;

use anyhow::Result;
use atlas_client::{EntityPayload, TypeDefPayload};
use atlas_tasks::{CatalogTask, TaskOperation};
use clap::Args;

use super::{Context, read_json};

/// Arguments shared by the create commands.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// JSON payload file
    pub file: PathBuf,
}

/// Run `create-typedefs`.
pub fn run_typedefs(args: CreateArgs, ctx: &Context) -> Result<()> {
    let payload: TypeDefPayload = read_json(&args.file)?;
    if payload.is_empty() {
        anyhow::bail!("{} contains no type definitions", args.file.display());
    }
    run_operation(TaskOperation::CreateTypeDefs(payload), "create_typedefs", ctx)
}

/// Run `create-entity`.
pub fn run_entity(args: CreateArgs, ctx: &Context) -> Result<()> {
    let payload: EntityPayload = read_json(&args.file)?;
    run_operation(TaskOperation::CreateEntity(payload), "create_entity", ctx)
}

/// Run `create-entities`.
pub fn run_entities(args: CreateArgs, ctx: &Context) -> Result<()> {
    let payload: EntityPayload = read_json(&args.file)?;
    run_operation(TaskOperation::CreateEntitiesBulk(payload), "create_entities", ctx)
}

fn run_operation(operation: TaskOperation, id: &str, ctx: &Context) -> Result<()> {
    let registry = ctx.registry()?;
    let task = CatalogTask::new(ctx.connection_id(&registry), operation).with_id(id);
    ctx.execute(registry, &task)
}
