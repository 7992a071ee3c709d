//! Error types for the Kiosk engines.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single completion request.
///
/// `status` is `None` when no HTTP response was received at all
/// (connection refused, timeout, DNS failure).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("API error {}: {body}", display_status(.status))]
pub struct ApiError {
    /// HTTP status code of the response, if any.
    pub status: Option<u16>,
    /// Response body or a description of what went wrong.
    pub body: String,
}

fn display_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "(no response)".to_string(),
    }
}

impl ApiError {
    /// Creates an error for a non-success HTTP status.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            body: body.into(),
        }
    }

    /// Creates an error for a request that never produced a response.
    pub fn transport(body: impl Into<String>) -> Self {
        Self {
            status: None,
            body: body.into(),
        }
    }
}

/// A shared error type for the whole Kiosk workspace.
///
/// Typed, structured variants with automatic conversion from common error
/// types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum KioskError {
    /// Completion API failure (bad status, malformed body, transport)
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Checkout attempted with no line items
    #[error("Cannot check out an empty cart")]
    EmptyCart,

    /// Rejected user input (e.g. a negative price)
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Stored document could not be migrated or written by the migrator
    #[error("Migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl KioskError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for KioskError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for KioskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for KioskError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for KioskError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<version_migrate::MigrationError> for KioskError {
    fn from(err: version_migrate::MigrationError) -> Self {
        use version_migrate::MigrationError;

        match err {
            MigrationError::DeserializationError(_) | MigrationError::SerializationError(_) => {
                Self::Serialization {
                    format: "migration".to_string(),
                    message: err.to_string(),
                }
            }
            _ => Self::Migration(err.to_string()),
        }
    }
}

/// A type alias for `Result<T, KioskError>`.
pub type Result<T> = std::result::Result<T, KioskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_with_status() {
        let err = ApiError::status(500, "boom");
        assert_eq!(err.to_string(), "API error 500: boom");
    }

    #[test]
    fn test_api_error_display_without_status() {
        let err = ApiError::transport("connection refused");
        assert_eq!(err.to_string(), "API error (no response): connection refused");
    }

    #[test]
    fn test_api_error_converts_into_kiosk_error() {
        let err: KioskError = ApiError::status(401, "unauthorized").into();
        assert!(matches!(err, KioskError::Api(ref api) if api.status == Some(401)));
        assert_eq!(err.to_string(), "API error 401: unauthorized");
    }

    #[test]
    fn test_io_conversion_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: KioskError = io.into();
        assert!(matches!(err, KioskError::Io { .. }));
        assert!(err.to_string().contains("NotFound"));
    }
}
