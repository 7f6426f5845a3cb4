//! Runtime-typed values.
//!
//! [`Value`] is the owned, dynamically-kinded value that flows through the
//! conversion registry. Its kind is always explicit via [`ValueKind`], so
//! converter selection is a lookup on a pair of tags rather than a probe of
//! the value's shape.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque reference identity of a record.
///
/// Negative values other than [`ElementId::INVALID`] are allowed; they name
/// built-in entities (categories, built-in parameters).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ElementId(pub i64);

impl ElementId {
    /// The "no element" identity.
    pub const INVALID: ElementId = ElementId(-1);

    /// Creates a new element id.
    pub fn new(value: i64) -> Self {
        ElementId(value)
    }

    /// Returns the raw integer value.
    pub fn value(self) -> i64 {
        self.0
    }

    /// Returns `true` unless this is [`ElementId::INVALID`].
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl From<i64> for ElementId {
    fn from(value: i64) -> Self {
        ElementId(value)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a workset, the unit of edit ownership in a shared store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorksetId(pub i64);

impl WorksetId {
    /// Returns the raw integer value.
    pub fn value(self) -> i64 {
        self.0
    }
}

/// Tag naming the runtime kind of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    Bool,
    Integer,
    Double,
    String,
    DateTime,
    ElementId,
    Workset,
}

impl ValueKind {
    /// Returns the display name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Integer => "integer",
            ValueKind::Double => "double",
            ValueKind::String => "string",
            ValueKind::DateTime => "datetime",
            ValueKind::ElementId => "element id",
            ValueKind::Workset => "workset",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Conversion target: a kind plus whether `null` is an acceptable result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    pub kind: ValueKind,
    pub nullable: bool,
}

impl Target {
    /// A non-nullable target of the given kind.
    pub fn new(kind: ValueKind) -> Self {
        Target {
            kind,
            nullable: false,
        }
    }

    /// A nullable target of the given kind.
    pub fn optional(kind: ValueKind) -> Self {
        Target {
            kind,
            nullable: true,
        }
    }
}

impl From<ValueKind> for Target {
    fn from(kind: ValueKind) -> Self {
        Target::new(kind)
    }
}

/// Owned runtime value.
///
/// # Example
///
/// ```
/// use sifter_convert::{Value, ValueKind};
///
/// let v = Value::from("3.5m");
/// assert_eq!(v.kind(), Some(ValueKind::String));
/// assert!(Value::Null.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    DateTime(DateTime<Utc>),
    ElementId(ElementId),
    Workset(WorksetId),
}

impl Value {
    /// Returns the kind of this value, or `None` for [`Value::Null`].
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::Integer(_) => Some(ValueKind::Integer),
            Value::Double(_) => Some(ValueKind::Double),
            Value::String(_) => Some(ValueKind::String),
            Value::DateTime(_) => Some(ValueKind::DateTime),
            Value::ElementId(_) => Some(ValueKind::ElementId),
            Value::Workset(_) => Some(ValueKind::Workset),
        }
    }

    /// Returns `true` if this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Extracts the string, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the integer, if present.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the double, if present.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the boolean, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extracts the element id, if present.
    pub fn as_element_id(&self) -> Option<ElementId> {
        match self {
            Value::ElementId(id) => Some(*id),
            _ => None,
        }
    }

    /// Extracts the timestamp, if present.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(n as i64)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Double(n as f64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<ElementId> for Value {
    fn from(id: ElementId) -> Self {
        Value::ElementId(id)
    }
}

impl From<WorksetId> for Value {
    fn from(id: WorksetId) -> Self {
        Value::Workset(id)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_kinds() {
        assert_eq!(Value::Null.kind(), None);
        assert_eq!(Value::from(true).kind(), Some(ValueKind::Bool));
        assert_eq!(Value::from(3i64).kind(), Some(ValueKind::Integer));
        assert_eq!(Value::from(3.5).kind(), Some(ValueKind::Double));
        assert_eq!(Value::from("x").kind(), Some(ValueKind::String));
        assert_eq!(
            Value::from(ElementId(7)).kind(),
            Some(ValueKind::ElementId)
        );
        assert_eq!(Value::from(WorksetId(2)).kind(), Some(ValueKind::Workset));
    }

    #[test]
    fn option_maps_to_null() {
        let none: Option<i64> = None;
        assert!(Value::from(none).is_null());
        assert_eq!(Value::from(Some(4i64)), Value::Integer(4));
    }

    #[test]
    fn element_id_validity() {
        assert!(!ElementId::INVALID.is_valid());
        assert!(ElementId(-2000100).is_valid());
        assert_eq!(ElementId::default(), ElementId(0));
    }

    #[test]
    fn target_constructors() {
        assert!(!Target::new(ValueKind::Integer).nullable);
        assert!(Target::optional(ValueKind::Integer).nullable);
        assert_eq!(Target::from(ValueKind::Bool).kind, ValueKind::Bool);
    }
}
