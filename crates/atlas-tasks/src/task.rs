//! Catalog task definitions and execution.
//!
//! A task is plain configuration: a connection id plus one operation and its
//! payload. Running it resolves the connection, opens one client, performs the
//! operation, and publishes the raw result under the operation's fixed slot.
//!
//! # Example TOML
//!
//! ```toml
//! id = "create_entity_task"
//! connection_id = "atlas_default"
//!
//! [operation]
//! type = "create_entities_bulk"
//!
//! [[operation.payload.entities]]
//! typeName = "hdfs_path"
//! status = "ACTIVE"
//! version = 1
//! attributes = { qualifiedName = "placements.csv", name = "placements.csv" }
//! ```

use std::path::Path;

use atlas_client::{
    AttributeFilter, CatalogClient, EntityPayload, SearchOptions, TypeDefPayload,
};
use atlas_config::ConnectionResolver;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Result, TaskError};
use crate::outputs::TaskOutputs;

/// Slot for type definition and single-entity responses.
pub const ENTITY_RESPONSE: &str = "entity_response";
/// Slot for bulk entity responses.
pub const ENTITIES_RESPONSE: &str = "entities_response";
/// Slot for attribute search results.
pub const SEARCH_ATTRIBUTES_RESPONSE: &str = "search_attributes_response";
/// Slot for DSL search results.
pub const SEARCH_DSL_RESPONSE: &str = "search_dsl_response";

/// The single catalog operation a task performs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum TaskOperation {
    CreateTypeDefs(TypeDefPayload),
    CreateEntity(EntityPayload),
    CreateEntitiesBulk(EntityPayload),
    SearchByAttributes(AttributeFilter),
    SearchByDsl(String),
}

impl TaskOperation {
    /// Slot the result is published under.
    pub fn output_key(&self) -> &'static str {
        match self {
            TaskOperation::CreateTypeDefs(_) | TaskOperation::CreateEntity(_) => ENTITY_RESPONSE,
            TaskOperation::CreateEntitiesBulk(_) => ENTITIES_RESPONSE,
            TaskOperation::SearchByAttributes(_) => SEARCH_ATTRIBUTES_RESPONSE,
            TaskOperation::SearchByDsl(_) => SEARCH_DSL_RESPONSE,
        }
    }

    /// Human-readable label used in start/stop log lines.
    pub fn label(&self) -> &'static str {
        match self {
            TaskOperation::CreateTypeDefs(_) => "TypeDef Creation",
            TaskOperation::CreateEntity(_) => "Entity Creation",
            TaskOperation::CreateEntitiesBulk(_) => "Bulk Entity Creation",
            TaskOperation::SearchByAttributes(_) => "Attribute Search",
            TaskOperation::SearchByDsl(_) => "DSL Search",
        }
    }
}

/// One unit of work for the workflow engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTask {
    /// Task identifier, used in logs.
    #[serde(default = "default_task_id")]
    pub id: String,

    /// Connection to resolve.
    pub connection_id: String,

    pub operation: TaskOperation,

    /// Paging for search operations; ignored otherwise.
    #[serde(default)]
    pub search: Option<SearchOptions>,
}

fn default_task_id() -> String {
    "catalog_task".to_string()
}

impl CatalogTask {
    pub fn new(connection_id: impl Into<String>, operation: TaskOperation) -> Self {
        Self {
            id: default_task_id(),
            connection_id: connection_id.into(),
            operation,
            search: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_search_options(mut self, options: SearchOptions) -> Self {
        self.search = Some(options);
        self
    }

    /// Parse a task definition from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| TaskError::InvalidTask(e.to_string()))
    }

    /// Parse a task definition from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str).map_err(|e| TaskError::InvalidTask(e.to_string()))
    }

    /// Load a task definition; `.json` files are JSON, everything else TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| TaskError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&contents)
        } else {
            Self::from_toml(&contents)
        }
    }

    /// Slot this task publishes under.
    pub fn output_key(&self) -> &'static str {
        self.operation.output_key()
    }

    /// Run the task: resolve, connect, call one operation, publish once.
    ///
    /// Nothing is published when any step fails.
    pub fn execute<R, O>(&self, resolver: &R, outputs: &mut O) -> Result<Value>
    where
        R: ConnectionResolver + ?Sized,
        O: TaskOutputs + ?Sized,
    {
        let label = self.operation.label();
        info!(task = %self.id, connection = %self.connection_id, "Start: {}", label);

        let client = CatalogClient::connect(resolver, &self.connection_id)?;
        let value = self.run(&client)?;
        outputs.publish(self.output_key(), value.clone())?;

        info!(task = %self.id, key = self.output_key(), "Stop: {}", label);
        Ok(value)
    }

    /// Call the operation on an existing client and return its serialized result.
    pub fn run(&self, client: &CatalogClient) -> Result<Value> {
        let options = self.search.unwrap_or_else(|| {
            SearchOptions::default().with_page_size(client.page_size())
        });

        let value = match &self.operation {
            TaskOperation::CreateTypeDefs(payload) => {
                debug!(task = %self.id, defs = payload.defs().count(), "typedef payload");
                serde_json::to_value(client.typedefs().create(payload)?)?
            }
            TaskOperation::CreateEntity(payload) => {
                debug!(task = %self.id, entities = payload.entities.len(), "entity payload");
                serde_json::to_value(client.entities().create(payload)?)?
            }
            TaskOperation::CreateEntitiesBulk(payload) => {
                debug!(task = %self.id, entities = payload.entities.len(), "entity payload");
                serde_json::to_value(client.entities().create_bulk(payload)?)?
            }
            TaskOperation::SearchByAttributes(filter) => {
                debug!(task = %self.id, filter = ?filter, "attribute search");
                serde_json::to_value(
                    client.search().by_attributes_with_options(filter, options)?,
                )?
            }
            TaskOperation::SearchByDsl(query) => {
                debug!(task = %self.id, query = %query, "dsl search");
                serde_json::to_value(client.search().by_dsl_with_options(query, options)?)?
            }
        };
        Ok(value)
    }
}
