//! Entities API.

use serde_json::{Map, Value};

use crate::client::CatalogClient;
use crate::error::{Error, Result};
use crate::types::{EntityPayload, ServerResponse};

/// How entities are wrapped in an upsert body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntityShape {
    /// `{"entity": {..}, "referredEntities": {..}}`
    Single,
    /// `{"entities": [..], "referredEntities": {..}}`
    Bulk,
}

/// Build the upsert body for either endpoint.
///
/// Records are serialized as given; identity fields are never added or rewritten.
pub(crate) fn entity_request_body(shape: EntityShape, payload: &EntityPayload) -> Result<Value> {
    let mut body = Map::new();
    match shape {
        EntityShape::Single => {
            let [entity] = payload.entities.as_slice() else {
                return Err(Error::InvalidPayload(format!(
                    "single-entity upsert needs exactly one entity, got {}",
                    payload.entities.len()
                )));
            };
            body.insert("entity".to_string(), serde_json::to_value(entity)?);
        }
        EntityShape::Bulk => {
            body.insert(
                "entities".to_string(),
                serde_json::to_value(&payload.entities)?,
            );
        }
    }
    body.insert(
        "referredEntities".to_string(),
        serde_json::to_value(&payload.referred_entities)?,
    );
    Ok(Value::Object(body))
}

/// Entities API client.
pub struct EntitiesApi {
    client: CatalogClient,
}

impl EntitiesApi {
    pub(crate) fn new(client: CatalogClient) -> Self {
        Self { client }
    }

    /// Create a new entity or update the existing one.
    ///
    /// The existing entity is matched by its guid if supplied, otherwise by its
    /// unique attributes (e.g. `qualifiedName`). `payload` must hold exactly
    /// one entity.
    pub fn create(&self, payload: &EntityPayload) -> Result<ServerResponse> {
        let body = entity_request_body(EntityShape::Single, payload)?;
        self.client.post("entity", &body)
    }

    /// Create new entities or update existing ones, matched as in [`create`](Self::create).
    ///
    /// Atomicity is whatever the catalog applies to a bulk request.
    pub fn create_bulk(&self, payload: &EntityPayload) -> Result<ServerResponse> {
        tracing::debug!(count = payload.entities.len(), "bulk entity upsert");
        let body = entity_request_body(EntityShape::Bulk, payload)?;
        self.client.post("entity/bulk", &body)
    }

    /// Fetch an entity by guid.
    pub fn get_by_guid(&self, guid: &str) -> Result<ServerResponse> {
        self.client
            .get(&format!("entity/guid/{}", urlencoding::encode(guid)))
    }

    /// Fetch an entity by one of its unique attributes.
    pub fn get_by_unique_attribute(
        &self,
        type_name: &str,
        attribute: &str,
        value: &str,
    ) -> Result<ServerResponse> {
        let path = format!(
            "entity/uniqueAttribute/type/{}",
            urlencoding::encode(type_name)
        );
        let key = format!("attr:{}", attribute);
        self.client.get_with_query(&path, &[(key.as_str(), value)])
    }
}
