//! Comparison operators for filter rules.
//!
//! [`ValueOp`] covers equality and ordering, the operators valid for
//! numeric and reference values. [`StringOp`] is a superset adding
//! substring, prefix, suffix and wildcard matching with explicit negated
//! variants.
//!
//! The six shared operators carry the same discriminant in both enums, so a
//! `StringOp` compares equal to the `ValueOp` it extends:
//!
//! ```
//! use sifter_filter::{StringOp, ValueOp};
//!
//! assert_eq!(StringOp::Greater, ValueOp::Greater);
//! assert_eq!(StringOp::Greater.code(), ValueOp::Greater.code());
//! assert_eq!(StringOp::Contains.as_value_op(), None);
//! ```

use std::cmp::Ordering;

/// Equality and ordering operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueOp {
    Equals = 0,
    NotEquals = 1,
    Greater = 2,
    GreaterOrEqual = 3,
    Less = 4,
    LessOrEqual = 5,
}

impl ValueOp {
    /// All value operators in discriminant order.
    pub const ALL: [ValueOp; 6] = [
        ValueOp::Equals,
        ValueOp::NotEquals,
        ValueOp::Greater,
        ValueOp::GreaterOrEqual,
        ValueOp::Less,
        ValueOp::LessOrEqual,
    ];

    /// The shared discriminant.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Returns `true` for the four ordering operators.
    pub fn is_ordering(self) -> bool {
        !matches!(self, ValueOp::Equals | ValueOp::NotEquals)
    }

    /// Evaluates this operator given `field.cmp(comparand)`.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            ValueOp::Equals => ordering == Ordering::Equal,
            ValueOp::NotEquals => ordering != Ordering::Equal,
            ValueOp::Greater => ordering == Ordering::Greater,
            ValueOp::GreaterOrEqual => ordering != Ordering::Less,
            ValueOp::Less => ordering == Ordering::Less,
            ValueOp::LessOrEqual => ordering != Ordering::Greater,
        }
    }

    /// Returns the display name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            ValueOp::Equals => "equals",
            ValueOp::NotEquals => "not-equals",
            ValueOp::Greater => "greater",
            ValueOp::GreaterOrEqual => "greater-or-equal",
            ValueOp::Less => "less",
            ValueOp::LessOrEqual => "less-or-equal",
        }
    }
}

impl std::fmt::Display for ValueOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// String operator: the value operators plus text matching.
///
/// All string comparisons are ordinal and case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StringOp {
    // Shared with ValueOp
    Equals = 0,
    NotEquals = 1,
    Greater = 2,
    GreaterOrEqual = 3,
    Less = 4,
    LessOrEqual = 5,

    // Text matching
    Contains = 6,
    NotContains = 7,
    BeginsWith = 8,
    NotBeginsWith = 9,
    EndsWith = 10,
    NotEndsWith = 11,
    /// `*`-separated pattern, expanded by the rule factory.
    Wildcard = 12,
}

impl StringOp {
    /// The shared discriminant.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// The equivalent [`ValueOp`], for the six shared operators.
    pub fn as_value_op(self) -> Option<ValueOp> {
        match self {
            StringOp::Equals => Some(ValueOp::Equals),
            StringOp::NotEquals => Some(ValueOp::NotEquals),
            StringOp::Greater => Some(ValueOp::Greater),
            StringOp::GreaterOrEqual => Some(ValueOp::GreaterOrEqual),
            StringOp::Less => Some(ValueOp::Less),
            StringOp::LessOrEqual => Some(ValueOp::LessOrEqual),
            _ => None,
        }
    }

    /// Returns `true` for the negated text operators and `NotEquals`.
    pub fn is_negated(self) -> bool {
        matches!(
            self,
            StringOp::NotEquals
                | StringOp::NotContains
                | StringOp::NotBeginsWith
                | StringOp::NotEndsWith
        )
    }

    /// Strips negation: `NotContains` → `Contains`, etc.
    pub fn positive(self) -> StringOp {
        match self {
            StringOp::NotEquals => StringOp::Equals,
            StringOp::NotContains => StringOp::Contains,
            StringOp::NotBeginsWith => StringOp::BeginsWith,
            StringOp::NotEndsWith => StringOp::EndsWith,
            other => other,
        }
    }

    /// Returns the display name of this operator.
    pub fn as_str(self) -> &'static str {
        match self.as_value_op() {
            Some(op) => op.as_str(),
            None => match self {
                StringOp::Contains => "contains",
                StringOp::NotContains => "not-contains",
                StringOp::BeginsWith => "begins-with",
                StringOp::NotBeginsWith => "not-begins-with",
                StringOp::EndsWith => "ends-with",
                StringOp::NotEndsWith => "not-ends-with",
                _ => "wildcard",
            },
        }
    }
}

impl From<ValueOp> for StringOp {
    fn from(op: ValueOp) -> Self {
        match op {
            ValueOp::Equals => StringOp::Equals,
            ValueOp::NotEquals => StringOp::NotEquals,
            ValueOp::Greater => StringOp::Greater,
            ValueOp::GreaterOrEqual => StringOp::GreaterOrEqual,
            ValueOp::Less => StringOp::Less,
            ValueOp::LessOrEqual => StringOp::LessOrEqual,
        }
    }
}

impl PartialEq<ValueOp> for StringOp {
    fn eq(&self, other: &ValueOp) -> bool {
        self.code() == other.code()
    }
}

impl PartialEq<StringOp> for ValueOp {
    fn eq(&self, other: &StringOp) -> bool {
        self.code() == other.code()
    }
}

impl std::fmt::Display for StringOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
