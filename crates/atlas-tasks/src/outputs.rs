//! The engine's cross-task data store, seen from a task.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{Result, TaskError};

/// Side channel a task publishes its result into.
///
/// A task calls [`publish`](TaskOutputs::publish) exactly once, and only
/// after its operation succeeded.
pub trait TaskOutputs {
    fn publish(&mut self, key: &str, value: Value) -> Result<()>;
}

/// In-process output store keyed by slot name.
///
/// Publishing the same key twice is refused, which keeps a task from
/// silently overwriting an upstream result.
#[derive(Debug, Default, Clone)]
pub struct MemoryOutputs {
    data: HashMap<String, Value>,
}

impl MemoryOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consume the store, returning the raw map.
    pub fn into_inner(self) -> HashMap<String, Value> {
        self.data
    }
}

impl TaskOutputs for MemoryOutputs {
    fn publish(&mut self, key: &str, value: Value) -> Result<()> {
        if self.data.contains_key(key) {
            return Err(TaskError::Publish {
                key: key.to_string(),
                reason: "slot already holds a value".to_string(),
            });
        }
        self.data.insert(key.to_string(), value);
        Ok(())
    }
}
