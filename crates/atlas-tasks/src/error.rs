//! Error types for catalog tasks.

use thiserror::Error;

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, TaskError>;

/// Errors that can occur while loading or running a task.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The catalog call (or connection lookup) failed.
    #[error("Catalog operation failed: {0}")]
    Catalog(#[from] atlas_client::Error),

    /// The engine's data store refused the result.
    #[error("Publish failed for '{key}': {reason}")]
    Publish { key: String, reason: String },

    /// Failed to read a task definition file.
    #[error("Failed to read task file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Invalid task definition.
    #[error("Invalid task: {0}")]
    InvalidTask(String),

    /// Failed to serialize a result for publication.
    #[error("Failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl TaskError {
    /// Whether the orchestrator may retry the task with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TaskError::Catalog(e) if e.is_retryable())
    }
}
