//! Error types for the filter crate.

use thiserror::Error;

use crate::op::StringOp;

/// Errors that can occur when building filter rules.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Operator is not valid for the given value kind.
    #[error("operator '{op}' is not valid for {value_kind} values")]
    UnsupportedOperator {
        op: StringOp,
        value_kind: &'static str,
    },

    /// A null comparand cannot produce a rule.
    #[error("cannot compare parameter '{param}' against a null value")]
    NullValue { param: String },

    /// Double tolerance must be finite and non-negative.
    #[error("invalid double tolerance: {0}")]
    InvalidTolerance(f64),

    /// The comparand could not be converted to the attribute's storage kind.
    #[error(transparent)]
    Convert(#[from] sifter_convert::ConvertError),
}

/// Result type for filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;
