//! Client error types.
//!
//! Every failure is classified so the caller can decide whether to retry:
//! only [`Error::Unreachable`] is transient.

use atlas_config::ConfigError;
use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Connect failure, timeout, interrupted body, or a gateway status (502/503/504).
    #[error("catalog unreachable: {reason}")]
    Unreachable {
        reason: String,
        /// HTTP status, when the failure came from a gateway response.
        status: Option<u16>,
    },

    /// Non-2xx response; the body is kept verbatim for diagnostics.
    #[error("catalog rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The catalog refused the payload on semantic grounds (e.g. unknown type name).
    #[error("catalog validation failed ({code}): {message}")]
    Validation {
        status: u16,
        code: String,
        message: String,
        body: String,
    },

    /// 2xx response whose body does not match the expected schema.
    #[error("malformed catalog response: {reason}")]
    MalformedResponse { reason: String, body: String },

    /// Client-side precondition on the request payload.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Connection lookup failed.
    #[error(transparent)]
    Connection(#[from] ConfigError),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization of a request body failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Error::Config(err.to_string())
        } else {
            Error::Unreachable {
                reason: err.to_string(),
                status: err.status().map(|s| s.as_u16()),
            }
        }
    }
}

impl Error {
    /// Safe to retry with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Unreachable { .. })
    }

    /// The resolver does not know the connection identifier.
    pub fn is_connection_not_found(&self) -> bool {
        matches!(self, Error::Connection(ConfigError::ConnectionNotFound(_)))
    }

    /// The connection exists but is missing a host, login, or password.
    pub fn is_connection_invalid(&self) -> bool {
        matches!(self, Error::Connection(ConfigError::ConnectionInvalid { .. }))
    }

    /// The catalog refused the payload on semantic grounds.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Rejected { status: 401 | 403, .. })
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Unreachable { status, .. } => *status,
            Error::Rejected { status, .. } | Error::Validation { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body provided by the catalog, if any.
    pub fn server_body(&self) -> Option<&str> {
        match self {
            Error::Rejected { body, .. }
            | Error::Validation { body, .. }
            | Error::MalformedResponse { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error envelope returned by the catalog.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorResponse {
    pub error_code: String,
    #[serde(default)]
    pub error_message: String,
}

/// Error-code prefixes the catalog uses for semantic validation failures.
const VALIDATION_CODE_PREFIXES: [&str; 2] = ["ATLAS-400-", "ATLAS-404-"];

/// Classify a non-2xx response.
pub(crate) fn classify_status(status: u16, body: String) -> Error {
    if matches!(status, 502..=504) {
        return Error::Unreachable {
            reason: format!("HTTP {}", status),
            status: Some(status),
        };
    }

    if let Ok(envelope) = serde_json::from_str::<ErrorResponse>(&body)
        && VALIDATION_CODE_PREFIXES
            .iter()
            .any(|prefix| envelope.error_code.starts_with(prefix))
    {
        return Error::Validation {
            status,
            code: envelope.error_code,
            message: envelope.error_message,
            body,
        };
    }

    Error::Rejected { status, body }
}
