//! Attribute values as seen by rules.
//!
//! [`AttrValue`] is the value of one attribute on one record, borrowed from
//! the record for the duration of a rule evaluation. Its variants mirror the
//! storage kinds a record attribute can have.

use std::cmp::Ordering;

use sifter_convert::{ElementId, Value, ValueKind};
use sifter_params::ParameterId;

/// Storage kind of a record attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageKind {
    #[default]
    None,
    Integer,
    Double,
    String,
    ElementId,
}

impl StorageKind {
    /// The conversion target kind for values written to this storage.
    pub fn value_kind(self) -> Option<ValueKind> {
        match self {
            StorageKind::None => None,
            StorageKind::Integer => Some(ValueKind::Integer),
            StorageKind::Double => Some(ValueKind::Double),
            StorageKind::String => Some(ValueKind::String),
            StorageKind::ElementId => Some(ValueKind::ElementId),
        }
    }

    /// Returns the display name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKind::None => "none",
            StorageKind::Integer => "integer",
            StorageKind::Double => "double",
            StorageKind::String => "string",
            StorageKind::ElementId => "element id",
        }
    }
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Runtime value of an attribute, borrowed from the record.
///
/// # Example
///
/// ```
/// use sifter_filter::{AttrValue, StorageKind};
///
/// let v = AttrValue::String("Level 1");
/// assert_eq!(v.kind(), StorageKind::String);
/// assert!(AttrValue::None.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttrValue<'a> {
    /// Attribute absent, or present with no value.
    None,
    Integer(i64),
    Double(f64),
    String(&'a str),
    ElementId(ElementId),
}

impl<'a> AttrValue<'a> {
    /// Returns the storage kind of this value.
    pub fn kind(&self) -> StorageKind {
        match self {
            AttrValue::None => StorageKind::None,
            AttrValue::Integer(_) => StorageKind::Integer,
            AttrValue::Double(_) => StorageKind::Double,
            AttrValue::String(_) => StorageKind::String,
            AttrValue::ElementId(_) => StorageKind::ElementId,
        }
    }

    /// Returns `true` if this is [`AttrValue::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, AttrValue::None)
    }

    /// Extracts the string, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the element id, if present.
    pub fn as_element_id(&self) -> Option<ElementId> {
        match self {
            AttrValue::ElementId(id) => Some(*id),
            _ => None,
        }
    }

    /// Extracts an integer or double as `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Integer(n) => Some(*n as f64),
            AttrValue::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrows a stored [`Value`] as an attribute value.
    ///
    /// Values with no storage counterpart (booleans, timestamps, worksets)
    /// are reported the way storage would hold them: booleans and worksets
    /// as integers, timestamps as epoch seconds.
    pub fn from_value(value: &'a Value) -> Self {
        match value {
            Value::Null => AttrValue::None,
            Value::Bool(b) => AttrValue::Integer(i64::from(*b)),
            Value::Integer(n) => AttrValue::Integer(*n),
            Value::Double(n) => AttrValue::Double(*n),
            Value::String(s) => AttrValue::String(s),
            Value::DateTime(dt) => AttrValue::Integer(dt.timestamp()),
            Value::ElementId(id) => AttrValue::ElementId(*id),
            Value::Workset(id) => AttrValue::Integer(id.value()),
        }
    }

    /// Converts to an owned [`Value`].
    pub fn to_value(&self) -> Value {
        match self {
            AttrValue::None => Value::Null,
            AttrValue::Integer(n) => Value::Integer(*n),
            AttrValue::Double(n) => Value::Double(*n),
            AttrValue::String(s) => Value::String((*s).to_string()),
            AttrValue::ElementId(id) => Value::ElementId(*id),
        }
    }
}

/// Compares two doubles, treating values within `epsilon` as equal.
pub fn compare_with_tolerance(a: f64, b: f64, epsilon: f64) -> Option<Ordering> {
    if (a - b).abs() <= epsilon {
        Some(Ordering::Equal)
    } else {
        a.partial_cmp(&b)
    }
}

/// Types whose attributes can be read by filter rules.
///
/// # Example
///
/// ```
/// use sifter_filter::{AttrValue, Attributed};
/// use sifter_params::ParameterId;
///
/// struct Door {
///     mark: String,
///     width: f64,
/// }
///
/// impl Attributed for Door {
///     fn attribute(&self, id: &ParameterId) -> AttrValue<'_> {
///         match id.display_name() {
///             Some("Mark") => AttrValue::String(&self.mark),
///             Some("Width") => AttrValue::Double(self.width),
///             _ => AttrValue::None,
///         }
///     }
/// }
/// ```
pub trait Attributed {
    /// Returns the value of an attribute, or [`AttrValue::None`] if the
    /// record does not carry it.
    fn attribute(&self, id: &ParameterId) -> AttrValue<'_>;
}

impl<T: Attributed + ?Sized> Attributed for &T {
    fn attribute(&self, id: &ParameterId) -> AttrValue<'_> {
        (**self).attribute(id)
    }
}
