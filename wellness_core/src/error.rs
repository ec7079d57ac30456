//! Error types for the wellness_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for wellness_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A caller-supplied value is outside its documented range
    #[error("Validation error: {0}")]
    Validation(String),

    /// The record store rejected a read or write
    #[error("Storage error: {0}")]
    Storage(String),

    /// The text/vision generation backend failed or returned unusable content
    #[error("Generation error: {0}")]
    Generation(String),

    /// A requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of an [`Error`], used when reporting failures to users.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Storage,
    Generation,
    Other,
}

impl Error {
    /// Classify this error into one of the user-facing failure kinds
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Io(_)
            | Error::Json(_)
            | Error::Csv(_)
            | Error::Storage(_)
            | Error::NotFound(_) => ErrorKind::Storage,
            Error::Generation(_) => ErrorKind::Generation,
            Error::Toml(_) | Error::Config(_) => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(
            Error::Validation("age".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::Io(io::Error::new(io::ErrorKind::Other, "disk")).kind(),
            ErrorKind::Storage
        );
        assert_eq!(
            Error::Generation("timeout".into()).kind(),
            ErrorKind::Generation
        );
        assert_eq!(Error::Config("bad".into()).kind(), ErrorKind::Other);
    }
}
