//! CLI command handlers.

pub mod connections;
pub mod create;
pub mod run;
pub mod search;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use atlas_config::{ChainResolver, ConnectionsConfig, EnvResolver};
use atlas_tasks::{CatalogTask, MemoryOutputs};
use serde_json::Value;

/// Connection used when neither the flag nor the registry names one.
pub const FALLBACK_CONNECTION: &str = "atlas_default";

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit registry file, if given.
    pub config_path: Option<PathBuf>,
    /// Connection identifier from `--connection`.
    pub connection: Option<String>,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Load the connection registry (explicit path, else discovered).
    pub fn registry(&self) -> Result<ConnectionsConfig> {
        let registry = match &self.config_path {
            Some(path) => atlas_config::load_connections_from(Some(path.as_path())),
            None => atlas_config::load_connections(),
        };
        registry.context("Failed to load connection registry")
    }

    /// Connection id to run against: flag, then registry default, then fallback.
    pub fn connection_id(&self, registry: &ConnectionsConfig) -> String {
        self.connection
            .clone()
            .or_else(|| registry.default_connection.clone())
            .unwrap_or_else(|| FALLBACK_CONNECTION.to_string())
    }

    /// Run one task against the registry, falling back to `ATLAS_CONN_*` variables.
    pub fn execute(&self, registry: ConnectionsConfig, task: &CatalogTask) -> Result<()> {
        let resolver = ChainResolver::new()
            .with(registry)
            .with(EnvResolver::new());

        let mut outputs = MemoryOutputs::new();
        task.execute(&resolver, &mut outputs)
            .with_context(|| format!("Task '{}' failed", task.id))?;

        let published: serde_json::Map<String, Value> = outputs.into_inner().into_iter().collect();
        println!("{}", serde_json::to_string_pretty(&published)?);
        Ok(())
    }
}

/// Read and decode a JSON payload file.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid payload in {}", path.display()))
}
