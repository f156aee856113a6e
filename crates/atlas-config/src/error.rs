//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading the registry or resolving a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config or secret file.
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to write a config file.
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse or serialize YAML.
    #[error("failed to parse YAML config: {0}")]
    ParseYaml(String),

    /// The identifier is not registered.
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),

    /// The connection exists but required fields are absent or unusable.
    #[error("connection '{id}' is invalid: {reason}")]
    ConnectionInvalid { id: String, reason: String },

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ConfigError {
    /// Shorthand for building a [`ConfigError::ConnectionInvalid`].
    pub fn invalid(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConnectionInvalid {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
