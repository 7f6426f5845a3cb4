//! Error types for the convert crate.

use thiserror::Error;

use crate::value::ValueKind;

/// Errors from evaluating a unit expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    /// Nothing left to evaluate after stripping `=` and whitespace.
    #[error("expression is empty")]
    Empty,

    /// A character that is not part of the arithmetic grammar.
    #[error("unexpected '{ch}' at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    /// Input ended while an operand or `)` was still expected.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// A numeric literal that does not parse.
    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    /// Right-hand side of `/` evaluated to zero.
    #[error("division by zero")]
    DivisionByZero,

    /// The result overflowed to infinity or NaN.
    #[error("result is not a finite number")]
    NotFinite,
}

/// Errors that can occur when converting a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// Source was null but the target does not accept null.
    #[error("null is not a valid {target}")]
    NullNotAllowed { target: ValueKind },

    /// No converter and no generic coercion covers this pair.
    #[error("no conversion from {from} to {to}")]
    Unsupported { from: ValueKind, to: ValueKind },

    /// A conversion path exists but rejected this particular value.
    #[error("cannot convert {from} value to {to}: {reason}")]
    Failed {
        from: ValueKind,
        to: ValueKind,
        reason: String,
    },

    /// A string was routed through the unit expression evaluator and failed.
    #[error("expression error: {0}")]
    Expression(#[from] ExprError),
}

impl ConvertError {
    pub(crate) fn failed(from: ValueKind, to: ValueKind, reason: impl Into<String>) -> Self {
        ConvertError::Failed {
            from,
            to,
            reason: reason.into(),
        }
    }
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
