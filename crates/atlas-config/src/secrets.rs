//! Password references and their resolution.
//!
//! A registry entry never has to hold a plaintext password. Resolution order:
//! 1. Inline `value` (plaintext, not recommended)
//! 2. `file` (contents trimmed, `~/` expanded)
//! 3. `env` variable
//! 4. System keyring (if `keyring` feature enabled)
//!
//! Keyring entries are looked up as service="atlas-bridge", user=`<keyring>`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Keyring service name.
const SERVICE_NAME: &str = "atlas-bridge";

/// Where a connection password comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SecretRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyring: Option<String>,
}

/// Where a secret was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    Inline,
    File(PathBuf),
    EnvVar(String),
    Keyring,
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::Inline => write!(f, "config file (plaintext)"),
            SecretSource::File(path) => write!(f, "file {}", path.display()),
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::Keyring => write!(f, "system keyring"),
        }
    }
}

/// Result of secret resolution with provenance.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    pub value: String,
    pub source: SecretSource,
}

impl std::fmt::Debug for ResolvedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecret")
            .field("value", &"****")
            .field("source", &self.source)
            .finish()
    }
}

impl SecretRef {
    /// Inline plaintext value.
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Read from an environment variable.
    pub fn env(var: impl Into<String>) -> Self {
        Self {
            env: Some(var.into()),
            ..Default::default()
        }
    }

    /// Read from a file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(path.into()),
            ..Default::default()
        }
    }

    /// Resolve the secret, returning `None` when no source yields a non-empty value.
    ///
    /// A configured file that exists but cannot be read is an error; a missing
    /// file falls through to the next source.
    pub fn resolve(&self) -> Result<Option<ResolvedSecret>> {
        if let Some(value) = &self.value
            && !value.is_empty()
        {
            return Ok(Some(ResolvedSecret {
                value: value.clone(),
                source: SecretSource::Inline,
            }));
        }

        if let Some(path) = &self.file {
            let expanded = expand_path(path);
            if expanded.exists() {
                let value = std::fs::read_to_string(&expanded)
                    .map_err(|e| ConfigError::ReadFile {
                        path: expanded.display().to_string(),
                        source: e,
                    })?
                    .trim()
                    .to_string();
                if !value.is_empty() {
                    return Ok(Some(ResolvedSecret {
                        value,
                        source: SecretSource::File(expanded),
                    }));
                }
            }
        }

        if let Some(var) = &self.env
            && let Ok(value) = std::env::var(var)
            && !value.is_empty()
        {
            return Ok(Some(ResolvedSecret {
                value,
                source: SecretSource::EnvVar(var.clone()),
            }));
        }

        if let Some(user) = &self.keyring {
            return Ok(get_from_keyring(user));
        }

        Ok(None)
    }
}

/// Expand ~ to home directory in paths.
pub(crate) fn expand_path(path: &Path) -> PathBuf {
    if let Some(s) = path.to_str()
        && let Some(rest) = s.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

// ─────────────────────────────────────────────────────────────────────────────
// Keyring implementation (feature-gated)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "keyring")]
fn get_from_keyring(user: &str) -> Option<ResolvedSecret> {
    // Keep tests isolated from local machine state.
    if cfg!(test) {
        return None;
    }

    let entry = keyring::Entry::new(SERVICE_NAME, user).ok()?;
    let value = entry.get_password().ok()?;
    if value.is_empty() {
        return None;
    }
    Some(ResolvedSecret {
        value,
        source: SecretSource::Keyring,
    })
}

#[cfg(not(feature = "keyring"))]
fn get_from_keyring(user: &str) -> Option<ResolvedSecret> {
    tracing::debug!(
        service = SERVICE_NAME,
        user,
        "keyring support not compiled in (enable the 'keyring' feature)"
    );
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
