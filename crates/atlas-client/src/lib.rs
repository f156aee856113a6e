//! Blocking HTTP client for the Apache Atlas v2 metadata catalog.
//!
//! This crate provides a typed, connection-scoped client for registering and
//! querying catalog metadata.
//!
//! # Example
//!
//! ```no_run
//! use atlas_client::{CatalogClient, EntityPayload, EntityRecord, Result, TypeDef, TypeDefPayload};
//! use atlas_config::ConnectionsConfig;
//!
//! # fn example(registry: &ConnectionsConfig) -> Result<()> {
//! // Resolve a named connection and open a session
//! let client = CatalogClient::connect(registry, "atlas_default")?;
//!
//! // Register a classification (a no-op if it already exists)
//! client.typedefs().create(&TypeDefPayload {
//!     classification_defs: vec![TypeDef::classification("Processed")],
//!     ..Default::default()
//! })?;
//!
//! // Upsert a dataset keyed by its qualified name
//! let entity = EntityRecord::new("hdfs_path")
//!     .with_attribute("qualifiedName", "placements.csv")
//!     .with_attribute("name", "placements.csv");
//! let response = client.entities().create(&EntityPayload::single(entity))?;
//! println!("{:?}", response.mutations()?.guid_assignments);
//!
//! // Query it back
//! let hits = client.search().by_dsl("hdfs_path where name = 'placements.csv'")?;
//! println!("{} hits", hits.len());
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Type definitions**: create, get by name
//! - **Entities**: single upsert, bulk upsert, get by guid or unique attribute
//! - **Search**: attribute search, DSL search (all pages, flattened)

pub mod api;
pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use api::{AttributeFilter, EntitiesApi, SearchApi, SearchOptions, TypeDefsApi};
pub use client::{CatalogClient, ClientBuilder, DEFAULT_PAGE_SIZE};
pub use error::{Error, Result};
pub use normalize::normalize;
pub use types::*;
