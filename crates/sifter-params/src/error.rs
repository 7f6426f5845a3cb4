//! Error types for the params crate.

use std::io;

/// Errors from building identifiers or (de)serializing metadata.
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    /// An identifier string or part list with nothing in it.
    #[error("identifier is empty")]
    EmptyIdentifier,

    /// A name was required but the given one is empty.
    #[error("parameter name must not be empty")]
    EmptyName,

    /// Built-in codes are negative by definition.
    #[error("built-in parameter code must be negative, got {0}")]
    NotBuiltin(i64),

    /// Numeric keys are non-negative by definition.
    #[error("parameter key must be non-negative, got {0}")]
    NegativeKey(i64),

    /// A persisted metadata entry does not describe a built-in parameter.
    #[error("metadata entry '{0}' is not a built-in parameter")]
    NotPersistable(String),

    /// Metadata JSON could not be read or written.
    #[error("metadata JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Byte store failure.
    #[error("byte store error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for params operations.
pub type Result<T> = std::result::Result<T, ParamError>;
