//! Error types and handling for sitewalk-core operations.
//!
//! This module provides the error type covering all failures in the page
//! record access layer. Errors carry a category label for structured logging
//! and keep the underlying source error where one exists.

use thiserror::Error;

/// The main error type for sitewalk-core operations.
///
/// All public functions in sitewalk-core return `Result<T, Error>`. Database
/// failures preserve the underlying `sqlx::Error` so callers can inspect the
/// driver-level cause through `source()`.
#[derive(Error, Debug)]
pub enum Error {
    /// A query failed at the database layer.
    ///
    /// Covers connection failures, SQL errors from malformed caller-supplied
    /// filter fragments, and row decoding mismatches. The query surface does
    /// not validate raw SQL fragments; they fail here.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An argument failed validation before any query was issued.
    ///
    /// Raised for page id lists containing values that cannot be page uids.
    /// The database is never touched when this is returned.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration is invalid or inaccessible.
    ///
    /// Occurs when the configuration file is malformed, contains invalid
    /// values, or the platform configuration directory cannot be determined.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Get the error category as a string identifier.
    ///
    /// Returns a static string that categorizes the error type for logging
    /// and metrics collection.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display_formatting() {
        let errors = vec![
            Error::InvalidArgument("bad uid".to_string()),
            Error::Config("missing field".to_string()),
            Error::Serialization("bad toml".to_string()),
        ];

        for error in errors {
            let error_string = error.to_string();
            assert!(!error_string.is_empty());
            match error {
                Error::InvalidArgument(msg) => {
                    assert!(error_string.contains("Invalid argument"));
                    assert!(error_string.contains(&msg));
                },
                Error::Config(msg) => {
                    assert!(error_string.contains("Configuration error"));
                    assert!(error_string.contains(&msg));
                },
                Error::Serialization(msg) => {
                    assert!(error_string.contains("Serialization error"));
                    assert!(error_string.contains(&msg));
                },
                _ => {},
            }
        }
    }

    #[test]
    fn test_error_categories() {
        let cases = vec![
            (Error::Io(io::Error::other("test")), "io"),
            (Error::InvalidArgument("test".to_string()), "invalid_argument"),
            (Error::Config("test".to_string()), "config"),
            (Error::Serialization("test".to_string()), "serialization"),
            (Error::Database(sqlx::Error::RowNotFound), "database"),
        ];

        for (error, expected) in cases {
            assert_eq!(error.category(), expected);
        }
    }

    #[test]
    fn test_error_chain_source() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: Error = io_error.into();

        let source = std::error::Error::source(&error);
        assert!(source.is_some());
        assert!(source.unwrap().to_string().contains("access denied"));
    }

    #[test]
    fn test_database_error_conversion() {
        let error: Error = sqlx::Error::RowNotFound.into();
        match error {
            Error::Database(_) => {},
            other => panic!("Expected Database variant, got {other:?}"),
        }
    }
}
