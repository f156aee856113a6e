//! Connection resolution for the Atlas catalog bridge.
//!
//! Provides:
//! - The [`Connection`] value a catalog client is built from
//! - The [`ConnectionResolver`] seam, so the client never talks to a registry directly
//! - A kubeconfig-style YAML registry (`connections.yaml`) with named connections
//! - Airflow-style connection URIs in environment variables (`ATLAS_CONN_<ID>`)
//! - Password resolution (inline → file → env var → keyring)

pub mod connection;
pub mod discovery;
pub mod env;
pub mod error;
pub mod registry;
pub mod secrets;

pub use connection::{
    ChainResolver, Connection, ConnectionResolver, DEFAULT_PORT, Scheme, Secret,
};
pub use discovery::{connections_path, load_connections, save_connections, xdg_config_dir};
pub use env::{EnvResolver, parse_connection_uri};
pub use error::{ConfigError, Result};
pub use registry::{
    ConnectionDefaults, ConnectionEntry, ConnectionsConfig, load_connections_from,
    save_connections_to,
};
pub use secrets::{ResolvedSecret, SecretRef, SecretSource};
