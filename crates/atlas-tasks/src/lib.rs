//! Workflow task adapters for the Atlas catalog.
//!
//! Each [`CatalogTask`] is a plain configuration struct: a connection id and
//! one [`TaskOperation`]. Executing it calls exactly one catalog operation and
//! publishes the serialized result into the engine's [`TaskOutputs`] under a
//! fixed slot name. Retry policy belongs to the orchestrator; use
//! [`TaskError::is_retryable`] to decide.

pub mod error;
pub mod outputs;
pub mod task;

pub use error::{Result, TaskError};
pub use outputs::{MemoryOutputs, TaskOutputs};
pub use task::{
    CatalogTask, ENTITIES_RESPONSE, ENTITY_RESPONSE, SEARCH_ATTRIBUTES_RESPONSE,
    SEARCH_DSL_RESPONSE, TaskOperation,
};
