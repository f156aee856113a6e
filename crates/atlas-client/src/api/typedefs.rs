//! Type definitions API.

use crate::client::CatalogClient;
use crate::error::Result;
use crate::types::{ServerResponse, TypeDefPayload};

/// Type definitions API client.
pub struct TypeDefsApi {
    client: CatalogClient,
}

impl TypeDefsApi {
    pub(crate) fn new(client: CatalogClient) -> Self {
        Self { client }
    }

    /// Create type definitions in one request.
    ///
    /// Only definitions whose names are new get created. The catalog leaves an
    /// existing definition with the same name untouched and discards any change
    /// to it; this client does not diff or reconcile.
    pub fn create(&self, payload: &TypeDefPayload) -> Result<ServerResponse> {
        tracing::debug!(count = payload.defs().count(), "creating type definitions");
        let body = serde_json::to_value(payload)?;
        self.client.post("types/typedefs", &body)
    }

    /// Fetch a type definition of any category by name.
    pub fn get_by_name(&self, name: &str) -> Result<ServerResponse> {
        self.client
            .get(&format!("types/typedef/name/{}", urlencoding::encode(name)))
    }
}
