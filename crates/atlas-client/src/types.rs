//! Request and response types for the Atlas v2 API.
//!
//! Payload records keep any field they do not model in an `extra` map, so a
//! caller's JSON reaches the catalog unchanged.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Attribute mapping of an entity.
pub type Attributes = Map<String, Value>;

// ─────────────────────────────────────────────────────────────────────────────
// Entities
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle status of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    Active,
    Deleted,
}

/// One entity instance to upsert.
///
/// Identity is the `guid` when present, otherwise `(type_name, unique attribute)`
/// such as `qualifiedName`. The client never fills in either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    pub type_name: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    /// Fields passed through verbatim (`classifications`, `relationshipAttributes`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityRecord {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self::from_attributes(type_name, Attributes::new())
    }

    /// Wrap an attribute mapping (e.g. one search hit) as a record of `type_name`.
    pub fn from_attributes(type_name: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            guid: None,
            type_name: type_name.into(),
            attributes,
            status: None,
            version: None,
            extra: Map::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_status(mut self, status: EntityStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    /// The `qualifiedName` attribute, when it is a string.
    pub fn qualified_name(&self) -> Option<&str> {
        self.attributes.get("qualifiedName").and_then(Value::as_str)
    }
}

/// Entities to upsert plus the entities they refer to, keyed by guid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityPayload {
    pub entities: Vec<EntityRecord>,
    #[serde(default)]
    pub referred_entities: BTreeMap<String, EntityRecord>,
}

impl EntityPayload {
    pub fn new(entities: Vec<EntityRecord>) -> Self {
        Self {
            entities,
            referred_entities: BTreeMap::new(),
        }
    }

    /// Payload holding exactly one record.
    pub fn single(entity: EntityRecord) -> Self {
        Self::new(vec![entity])
    }

    pub fn with_referred(mut self, guid: impl Into<String>, entity: EntityRecord) -> Self {
        self.referred_entities.insert(guid.into(), entity);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Type definitions
// ─────────────────────────────────────────────────────────────────────────────

/// Category of a type definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeCategory {
    Primitive,
    ObjectIdType,
    Enum,
    Struct,
    Classification,
    Entity,
    Array,
    Map,
    Relationship,
    BusinessMetadata,
}

/// Attribute cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cardinality {
    Single,
    List,
    Set,
}

/// Attribute specification inside a type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDef {
    pub name: String,
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<Cardinality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_unique: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_indexable: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AttributeDef {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_optional: None,
            cardinality: None,
            is_unique: None,
            is_indexable: None,
            extra: Map::new(),
        }
    }
}

/// One type definition (enum, struct, entity, classification, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDef {
    /// Unique within its category.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<TypeCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_version: Option<String>,
    #[serde(default)]
    pub attribute_defs: Vec<AttributeDef>,
    #[serde(default)]
    pub super_types: BTreeSet<String>,
    /// Fields passed through verbatim (`elementDefs`, `entityTypes`, `endDef1`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TypeDef {
    pub fn new(name: impl Into<String>, category: TypeCategory) -> Self {
        Self {
            name: name.into(),
            category: Some(category),
            description: None,
            type_version: Some("1.0".to_string()),
            attribute_defs: Vec::new(),
            super_types: BTreeSet::new(),
            extra: Map::new(),
        }
    }

    pub fn classification(name: impl Into<String>) -> Self {
        Self::new(name, TypeCategory::Classification)
    }

    pub fn entity(name: impl Into<String>) -> Self {
        Self::new(name, TypeCategory::Entity)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeDef) -> Self {
        self.attribute_defs.push(attribute);
        self
    }

    pub fn with_super_type(mut self, super_type: impl Into<String>) -> Self {
        self.super_types.insert(super_type.into());
        self
    }
}

/// A batch of type definitions grouped by category.
///
/// Empty groups are left out of the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDefPayload {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_defs: Vec<TypeDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub struct_defs: Vec<TypeDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entity_defs: Vec<TypeDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classification_defs: Vec<TypeDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationship_defs: Vec<TypeDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub business_metadata_defs: Vec<TypeDef>,
}

impl TypeDefPayload {
    /// All definitions across every category, in category order.
    pub fn defs(&self) -> impl Iterator<Item = &TypeDef> {
        self.enum_defs
            .iter()
            .chain(&self.struct_defs)
            .chain(&self.entity_defs)
            .chain(&self.classification_defs)
            .chain(&self.relationship_defs)
            .chain(&self.business_metadata_defs)
    }

    pub fn is_empty(&self) -> bool {
        self.defs().next().is_none()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Search
// ─────────────────────────────────────────────────────────────────────────────

/// Entity header as returned inside search and mutation responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classification_names: Vec<String>,
    pub attributes: Attributes,
}

/// One page of a search response.
///
/// The catalog omits `entities` entirely when a page has no hits, but always
/// sends `queryType`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_text: Option<String>,
    #[serde(default)]
    pub entities: Vec<EntityHeader>,
}

impl SearchBatch {
    /// Decode a page from a 2xx response, failing loudly on schema mismatch.
    pub fn from_response(response: &ServerResponse) -> Result<Self> {
        let malformed = |reason: &str| Error::MalformedResponse {
            reason: reason.to_string(),
            body: response.body.to_string(),
        };

        let Some(fields) = response.body.as_object() else {
            return Err(malformed("search response is not a JSON object"));
        };
        if !fields.get("queryType").is_some_and(Value::is_string) {
            return Err(malformed("search response has no queryType"));
        }
        // Projection queries (`select ...`) answer with attribute tables, not entities.
        if fields.contains_key("attributes") && !fields.contains_key("entities") {
            return Err(malformed(
                "search response carries attribute rows instead of entities",
            ));
        }

        serde_json::from_value(response.body.clone()).map_err(|e| Error::MalformedResponse {
            reason: format!("unexpected search response shape: {}", e),
            body: response.body.to_string(),
        })
    }
}

/// Flattened search output: one attribute mapping per hit, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub entities: Vec<Attributes>,
}

impl SearchResult {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attributes> {
        self.entities.iter()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────────────────

/// Raw 2xx response from a mutating or lookup call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerResponse {
    pub status: u16,
    /// Parsed JSON body; `null` when the catalog sent no body.
    pub body: Value,
}

impl ServerResponse {
    /// Decode the body as an entity mutation response.
    pub fn mutations(&self) -> Result<EntityMutationResponse> {
        serde_json::from_value(self.body.clone()).map_err(|e| Error::MalformedResponse {
            reason: format!("unexpected entity mutation response shape: {}", e),
            body: self.body.to_string(),
        })
    }
}

/// Result of an entity upsert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMutationResponse {
    /// Headers keyed by mutation kind (`CREATE`, `UPDATE`, `DELETE`, ...).
    #[serde(default)]
    pub mutated_entities: BTreeMap<String, Vec<EntityHeader>>,
    /// Caller-supplied placeholder guid → catalog-assigned guid.
    #[serde(default)]
    pub guid_assignments: BTreeMap<String, String>,
}

impl EntityMutationResponse {
    /// Headers for one mutation kind.
    pub fn mutated(&self, kind: &str) -> &[EntityHeader] {
        self.mutated_entities
            .get(kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn created(&self) -> &[EntityHeader] {
        self.mutated("CREATE")
    }

    pub fn updated(&self) -> &[EntityHeader] {
        self.mutated("UPDATE")
    }
}
