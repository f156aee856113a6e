//! Registry file discovery.
//!
//! Resolution order:
//! 1. Explicit path (handled by callers via [`load_connections_from`])
//! 2. `$ATLAS_BRIDGE_CONFIG_DIR/connections.yaml`
//! 3. `<platform config dir>/atlas-bridge/connections.yaml`

use std::path::PathBuf;

use crate::{ConfigError, ConnectionsConfig, Result};
use crate::registry::{load_connections_from, save_connections_to};

/// Default registry filename within the config directory.
const CONNECTIONS_FILE: &str = "connections.yaml";

/// Application name for XDG directory resolution.
const APP_NAME: &str = "atlas-bridge";

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "ATLAS_BRIDGE_CONFIG_DIR";

/// Get the config directory.
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the path to the registry file.
pub fn connections_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(CONNECTIONS_FILE))
}

/// Load the registry from the discovered location.
///
/// Returns an empty registry if the file doesn't exist.
pub fn load_connections() -> Result<ConnectionsConfig> {
    let path = connections_path();
    tracing::debug!(path = ?path, "loading connection registry");
    load_connections_from(path.as_deref())
}

/// Save the registry to the discovered location.
pub fn save_connections(config: &ConnectionsConfig) -> Result<()> {
    let path = connections_path()
        .ok_or_else(|| ConfigError::Other("Could not determine config directory".to_string()))?;
    save_connections_to(config, &path)
}
