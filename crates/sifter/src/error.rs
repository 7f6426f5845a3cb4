//! Error types for the sifter crate.

use sifter_convert::{ConvertError, ElementId};
use sifter_filter::FilterError;
use sifter_params::ParamError;
use thiserror::Error;

/// Why an attribute write was refused.
#[derive(Debug, Error)]
pub enum AttributeError {
    /// No record with this id.
    #[error("element {0} not found")]
    ElementNotFound(ElementId),

    /// The record does not carry the attribute.
    #[error("attribute '{param}' not found on element {element}")]
    NotFound { element: ElementId, param: String },

    /// The attribute cannot be written.
    #[error("attribute '{param}' on element {element} is read-only")]
    ReadOnly { element: ElementId, param: String },

    /// The attribute has no storage to write to.
    #[error("attribute '{param}' on element {element} has no storage")]
    NoStorage { element: ElementId, param: String },

    /// The record is owned by someone else.
    #[error("element {element} is owned by '{owner}' and cannot be edited by '{user}'")]
    NotEditable {
        element: ElementId,
        owner: String,
        user: String,
    },

    /// The value does not convert to the attribute's storage kind.
    #[error("cannot store value in attribute '{param}': {source}")]
    Conversion {
        param: String,
        #[source]
        source: ConvertError,
    },
}

/// Errors that can occur in collectors, scopes, caches and settings.
#[derive(Debug, Error)]
pub enum SifterError {
    #[error(transparent)]
    Attribute(#[from] AttributeError),

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    /// A mutation scope could not change state.
    #[error("mutation scope '{label}' failed: {reason}")]
    Scope { label: String, reason: String },

    /// Settings could not be parsed.
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_yaml::Error),
}

/// Result type for sifter operations.
pub type Result<T> = std::result::Result<T, SifterError>;
