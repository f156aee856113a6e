//! File-backed connection registry.
//!
//! Implements a kubeconfig-style file with named connections:
//!
//! ```yaml
//! api-version: v1
//! kind: ConnectionsConfig
//!
//! default-connection: atlas_default
//!
//! connections:
//!   - name: atlas_default
//!     host: atlas.example.com
//!     port: 21000
//!     login: admin
//!     password:
//!       env: ATLAS_PASSWORD
//!   - name: atlas_secure
//!     host: https://atlas.example.com
//!     port: 443
//!     login: svc-airflow
//!     password:
//!       file: ~/.config/atlas-bridge/secure.pw
//!     timeout: 60
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::connection::{DEFAULT_PORT, split_scheme};
use crate::secrets::SecretRef;
use crate::{ConfigError, Connection, ConnectionResolver, Result, Scheme};

/// API version for the registry file format.
pub const API_VERSION: &str = "v1";

/// Kind identifier for registry files.
pub const KIND: &str = "ConnectionsConfig";

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Root registry structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConnectionsConfig {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    /// Connection used when a caller does not name one.
    #[serde(default)]
    pub default_connection: Option<String>,

    #[serde(default)]
    pub connections: Vec<ConnectionEntry>,

    #[serde(default)]
    pub defaults: ConnectionDefaults,
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

fn default_kind() -> String {
    KIND.to_string()
}

impl ConnectionsConfig {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            ..Default::default()
        }
    }

    /// Parse from a YAML string.
    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        serde_yaml::from_str(yaml_str).map_err(|e| ConfigError::ParseYaml(e.to_string()))
    }

    /// Serialize to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::ParseYaml(e.to_string()))
    }

    /// Get an entry by name.
    pub fn get(&self, name: &str) -> Option<&ConnectionEntry> {
        self.connections.iter().find(|c| c.name == name)
    }

    /// Add or replace an entry.
    pub fn set_connection(&mut self, entry: ConnectionEntry) {
        if let Some(existing) = self.connections.iter_mut().find(|c| c.name == entry.name) {
            *existing = entry;
        } else {
            self.connections.push(entry);
        }
    }

    /// Remove an entry by name.
    pub fn remove_connection(&mut self, name: &str) -> Option<ConnectionEntry> {
        let pos = self.connections.iter().position(|c| c.name == name)?;
        if self.default_connection.as_deref() == Some(name) {
            self.default_connection = None;
        }
        Some(self.connections.remove(pos))
    }

    /// Set the default connection by name.
    pub fn use_connection(&mut self, name: &str) -> Result<()> {
        if self.get(name).is_some() {
            self.default_connection = Some(name.to_string());
            Ok(())
        } else {
            Err(ConfigError::ConnectionNotFound(name.to_string()))
        }
    }

    /// List all connection names.
    pub fn connection_names(&self) -> Vec<&str> {
        self.connections.iter().map(|c| c.name.as_str()).collect()
    }
}

impl ConnectionResolver for ConnectionsConfig {
    fn resolve(&self, id: &str) -> Result<Connection> {
        if id.is_empty() {
            return Err(ConfigError::ConnectionNotFound(id.to_string()));
        }
        let entry = self
            .get(id)
            .ok_or_else(|| ConfigError::ConnectionNotFound(id.to_string()))?;
        entry.to_connection(&self.defaults)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry
// ─────────────────────────────────────────────────────────────────────────────

/// One named connection as written in the registry file.
///
/// Fields are optional on disk so that an incomplete entry surfaces as
/// [`ConfigError::ConnectionInvalid`] at resolve time instead of a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConnectionEntry {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<Scheme>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretRef>,

    /// Request timeout override (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl ConnectionEntry {
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: Some(host.into()),
            ..Default::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = Some(scheme);
        self
    }

    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    pub fn with_password(mut self, password: SecretRef) -> Self {
        self.password = Some(password);
        self
    }

    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build a validated [`Connection`], filling gaps from `defaults`.
    pub fn to_connection(&self, defaults: &ConnectionDefaults) -> Result<Connection> {
        let host = self
            .host
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| ConfigError::invalid(&self.name, "host is missing"))?;
        let (host_scheme, host) = split_scheme(host);

        let login = self
            .login
            .clone()
            .ok_or_else(|| ConfigError::invalid(&self.name, "login is missing"))?;

        let secret = self
            .password
            .as_ref()
            .ok_or_else(|| ConfigError::invalid(&self.name, "password is missing"))?
            .resolve()?
            .ok_or_else(|| {
                ConfigError::invalid(&self.name, "password reference did not resolve")
            })?;
        tracing::debug!(connection = %self.name, source = %secret.source, "resolved password");

        let scheme = self
            .scheme
            .or(host_scheme)
            .unwrap_or(defaults.scheme);

        Connection {
            id: self.name.clone(),
            scheme,
            host,
            port: self.port.unwrap_or(defaults.port),
            username: login,
            secret: crate::Secret::new(secret.value),
            timeout: Some(Duration::from_secs(self.timeout.unwrap_or(defaults.timeout))),
        }
        .validate()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Settings applied to entries that leave them unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConnectionDefaults {
    pub scheme: Scheme,
    pub port: u16,
    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for ConnectionDefaults {
    fn default() -> Self {
        Self {
            scheme: Scheme::Http,
            port: DEFAULT_PORT,
            timeout: 30,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading / Saving
// ─────────────────────────────────────────────────────────────────────────────

/// Load a registry from a specific path.
///
/// Returns an empty registry if the path is absent or the file doesn't exist.
pub fn load_connections_from(path: Option<&Path>) -> Result<ConnectionsConfig> {
    let Some(path) = path else {
        return Ok(ConnectionsConfig::new());
    };

    if !path.exists() {
        return Ok(ConnectionsConfig::new());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;

    ConnectionsConfig::from_yaml(&contents)
}

/// Save a registry to a specific path, creating parent directories.
pub fn save_connections_to(config: &ConnectionsConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let contents = config.to_yaml()?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
