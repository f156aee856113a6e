//! Resolved catalog connections and the resolver seam.
//!
//! A [`Connection`] is the fully populated, immutable result of looking up a
//! named identifier. Anything that can produce one implements
//! [`ConnectionResolver`]; the catalog client only ever depends on the trait.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Default Atlas REST port.
pub const DEFAULT_PORT: u16 = 21000;

// ─────────────────────────────────────────────────────────────────────────────
// Scheme
// ─────────────────────────────────────────────────────────────────────────────

/// Transport scheme used to reach the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Secret
// ─────────────────────────────────────────────────────────────────────────────

/// Credential material. Never printed by `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the plaintext value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Connection
// ─────────────────────────────────────────────────────────────────────────────

/// A resolved catalog connection: where the service lives and how to log in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Identifier the connection was resolved from.
    pub id: String,
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub secret: Secret,
    /// Per-request timeout for clients built from this connection.
    pub timeout: Option<Duration>,
}

impl Connection {
    /// Create a connection using the default scheme and no timeout override.
    ///
    /// A host given as `https://name` sets the scheme and is stripped to `name`.
    pub fn new(
        id: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        let (scheme, host) = split_scheme(&host.into());
        Self {
            id: id.into(),
            scheme: scheme.unwrap_or_default(),
            host,
            port,
            username: username.into(),
            secret: Secret::new(secret),
            timeout: None,
        }
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Base URL of the catalog service, e.g. `http://atlas:21000`.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Check that every required field is present.
    pub fn validate(self) -> Result<Self> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::invalid(&self.id, "host is missing"));
        }
        if self.port == 0 {
            return Err(ConfigError::invalid(&self.id, "port must be non-zero"));
        }
        if self.username.trim().is_empty() {
            return Err(ConfigError::invalid(&self.id, "login is missing"));
        }
        if self.secret.is_empty() {
            return Err(ConfigError::invalid(&self.id, "password is missing"));
        }
        Ok(self)
    }
}

/// Split an optional `http://` / `https://` prefix off a host value.
pub(crate) fn split_scheme(host: &str) -> (Option<Scheme>, String) {
    let trimmed = host.trim().trim_end_matches('/');
    if let Some(rest) = trimmed.strip_prefix("https://") {
        (Some(Scheme::Https), rest.to_string())
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        (Some(Scheme::Http), rest.to_string())
    } else {
        (None, trimmed.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolver
// ─────────────────────────────────────────────────────────────────────────────

/// Resolves a named connection identifier into a [`Connection`].
///
/// Implementations fail with [`ConfigError::ConnectionNotFound`] for unknown
/// identifiers and [`ConfigError::ConnectionInvalid`] when host or credentials
/// are absent. Resolution is a lookup only.
pub trait ConnectionResolver {
    fn resolve(&self, id: &str) -> Result<Connection>;
}

impl<T: ConnectionResolver + ?Sized> ConnectionResolver for &T {
    fn resolve(&self, id: &str) -> Result<Connection> {
        (**self).resolve(id)
    }
}

impl<T: ConnectionResolver + ?Sized> ConnectionResolver for Box<T> {
    fn resolve(&self, id: &str) -> Result<Connection> {
        (**self).resolve(id)
    }
}

/// Tries each resolver in order; the first one that knows the identifier wins.
///
/// `ConnectionInvalid` from an earlier resolver is returned immediately rather
/// than masked by a later one.
#[derive(Default)]
pub struct ChainResolver {
    resolvers: Vec<Box<dyn ConnectionResolver + Send + Sync>>,
}

impl ChainResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resolver: impl ConnectionResolver + Send + Sync + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }
}

impl ConnectionResolver for ChainResolver {
    fn resolve(&self, id: &str) -> Result<Connection> {
        for resolver in &self.resolvers {
            match resolver.resolve(id) {
                Err(ConfigError::ConnectionNotFound(_)) => continue,
                other => return other,
            }
        }
        Err(ConfigError::ConnectionNotFound(id.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
