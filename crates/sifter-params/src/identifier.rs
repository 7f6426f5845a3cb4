//! Stable parameter identity.
//!
//! A parameter can be named four ways: by a negative built-in code, by a
//! GUID (shared parameters), by a non-negative numeric key (project
//! parameters), or by plain name. The same conceptual parameter often
//! reaches us through different paths, e.g. parsed from a settings string
//! in one place and read off a live record in another, so identity is
//! defined by a derived *stable form* rather than by the fields:
//!
//! ```text
//! guid present     → "<guid>"  or "<guid>;<name>"
//! builtin present  → "<code>"  or "<code>;<name>"
//! name present     → "<name>"
//! key only         → "<key>"
//! ```
//!
//! `Eq`, `Hash` and `Ord` all compare the stable form.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sifter_convert::ElementId;
use uuid::Uuid;

use crate::error::{ParamError, Result};

/// Identifier of a record attribute.
///
/// # Example
///
/// ```
/// use sifter_params::ParameterId;
///
/// let parsed: ParameterId = "-1001;Comments".parse().unwrap();
/// let built = ParameterId::builtin_named(-1001, "Comments").unwrap();
/// assert_eq!(parsed, built);
/// assert_eq!(parsed.to_string(), "-1001;Comments");
///
/// // Display names only count for guid and built-in identities.
/// assert_ne!(parsed, ParameterId::builtin(-1001).unwrap());
/// ```
#[derive(Clone)]
pub struct ParameterId {
    guid: Option<Uuid>,
    builtin: Option<i64>,
    key: Option<i64>,
    name: Option<String>,
    stable: String,
}

impl ParameterId {
    /// A built-in parameter. `code` must be negative.
    pub fn builtin(code: i64) -> Result<Self> {
        Self::from_parts(None, Some(code), None, None)
    }

    /// A built-in parameter with its display name.
    pub fn builtin_named(code: i64, name: &str) -> Result<Self> {
        Self::from_parts(None, Some(code), None, Some(name))
    }

    /// A shared parameter identified by GUID.
    pub fn guid(guid: Uuid) -> Self {
        Self::assemble(Some(guid), None, None, None)
    }

    /// A shared parameter identified by GUID, with its display name.
    pub fn guid_named(guid: Uuid, name: &str) -> Result<Self> {
        Self::from_parts(Some(guid), None, None, Some(name))
    }

    /// A project parameter identified by its non-negative numeric key.
    pub fn key(key: i64) -> Result<Self> {
        Self::from_parts(None, None, Some(key), None)
    }

    /// A parameter identified only by name.
    pub fn name(name: &str) -> Result<Self> {
        Self::from_parts(None, None, None, Some(name))
    }

    /// Builds an identifier from whatever is known about a parameter.
    ///
    /// This is the path used when reading a live record, where a parameter
    /// may expose several of these at once. The stable form picks the
    /// authoritative one by priority: guid, builtin, name, key.
    pub fn from_parts(
        guid: Option<Uuid>,
        builtin: Option<i64>,
        key: Option<i64>,
        name: Option<&str>,
    ) -> Result<Self> {
        if let Some(code) = builtin {
            if code >= 0 {
                return Err(ParamError::NotBuiltin(code));
            }
        }
        if let Some(k) = key {
            if k < 0 {
                return Err(ParamError::NegativeKey(k));
            }
        }
        let name = match name {
            Some("") if guid.is_none() && builtin.is_none() && key.is_none() => {
                return Err(ParamError::EmptyName)
            }
            Some("") | None => None,
            Some(n) => Some(n.to_string()),
        };
        if guid.is_none() && builtin.is_none() && key.is_none() && name.is_none() {
            return Err(ParamError::EmptyIdentifier);
        }
        Ok(Self::assemble(guid, builtin, key, name))
    }

    fn assemble(
        guid: Option<Uuid>,
        builtin: Option<i64>,
        key: Option<i64>,
        name: Option<String>,
    ) -> Self {
        let with_name = |head: String| match &name {
            Some(n) => format!("{head};{n}"),
            None => head,
        };
        let stable = if let Some(g) = guid {
            with_name(g.hyphenated().to_string())
        } else if let Some(code) = builtin {
            with_name(code.to_string())
        } else if let Some(n) = &name {
            n.clone()
        } else {
            key.map(|k| k.to_string()).unwrap_or_default()
        };
        ParameterId {
            guid,
            builtin,
            key,
            name,
            stable,
        }
    }

    /// The stable string form used for equality, hashing and persistence.
    pub fn stable(&self) -> &str {
        &self.stable
    }

    /// GUID, for shared parameters.
    pub fn guid_value(&self) -> Option<Uuid> {
        self.guid
    }

    /// Negative built-in code, for built-in parameters.
    pub fn builtin_code(&self) -> Option<i64> {
        self.builtin
    }

    /// Numeric key, for project parameters.
    pub fn key_value(&self) -> Option<i64> {
        self.key
    }

    /// Display or authoritative name, when known.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns `true` for built-in parameters.
    ///
    /// A guid takes priority, so a parameter carrying both is not built-in.
    pub fn is_builtin(&self) -> bool {
        self.guid.is_none() && self.builtin.is_some()
    }

    /// Returns `true` for shared (guid) parameters.
    pub fn is_shared(&self) -> bool {
        self.guid.is_some()
    }

    /// Returns this identifier without its display name.
    ///
    /// Name-only identifiers are returned unchanged.
    pub fn without_name(&self) -> ParameterId {
        if self.guid.is_none() && self.builtin.is_none() && self.key.is_none() {
            return self.clone();
        }
        Self::assemble(self.guid, self.builtin, self.key, None)
    }

    /// Returns `true` if both identifiers name the same parameter,
    /// ignoring display names.
    ///
    /// ```
    /// use sifter_params::ParameterId;
    ///
    /// let on_record = ParameterId::builtin_named(-1001, "Comments").unwrap();
    /// assert!(on_record.same_parameter(&ParameterId::builtin(-1001).unwrap()));
    /// assert!(!on_record.same_parameter(&ParameterId::builtin(-1002).unwrap()));
    /// ```
    pub fn same_parameter(&self, other: &ParameterId) -> bool {
        self == other || self.without_name() == other.without_name()
    }
}

impl PartialEq for ParameterId {
    fn eq(&self, other: &Self) -> bool {
        self.stable == other.stable
    }
}

impl Eq for ParameterId {}

impl Hash for ParameterId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.stable.hash(state);
    }
}

impl PartialOrd for ParameterId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ParameterId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.stable.cmp(&other.stable)
    }
}

impl fmt::Debug for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParameterId({})", self.stable)
    }
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stable)
    }
}

/// Parses `<guid> | <negative-int> | <non-negative-int> | <name>`,
/// optionally followed by `;<displayName>`.
///
/// The display name is kept for guid and built-in identities and ignored
/// for keys and plain names, whose stable form never carries one.
impl FromStr for ParameterId {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self> {
        let (head, display) = match s.split_once(';') {
            Some((h, d)) => (h, Some(d)),
            None => (s, None),
        };
        if head.is_empty() {
            return Err(ParamError::EmptyIdentifier);
        }

        if let Ok(guid) = Uuid::parse_str(head) {
            return Self::from_parts(Some(guid), None, None, display);
        }
        if let Ok(n) = head.parse::<i64>() {
            return if n < 0 {
                Self::from_parts(None, Some(n), None, display)
            } else {
                Self::key(n)
            };
        }
        Self::name(head)
    }
}

impl TryFrom<&str> for ParameterId {
    type Error = ParamError;

    fn try_from(s: &str) -> Result<Self> {
        s.parse()
    }
}

/// Negative values become built-in codes, the rest numeric keys.
impl From<i64> for ParameterId {
    fn from(n: i64) -> Self {
        if n < 0 {
            Self::assemble(None, Some(n), None, None)
        } else {
            Self::assemble(None, None, Some(n), None)
        }
    }
}

impl From<i32> for ParameterId {
    fn from(n: i32) -> Self {
        ParameterId::from(n as i64)
    }
}

impl From<ElementId> for ParameterId {
    fn from(id: ElementId) -> Self {
        ParameterId::from(id.value())
    }
}

impl From<Uuid> for ParameterId {
    fn from(guid: Uuid) -> Self {
        ParameterId::guid(guid)
    }
}

impl From<&ParameterId> for ParameterId {
    fn from(id: &ParameterId) -> Self {
        id.clone()
    }
}

impl Serialize for ParameterId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.stable)
    }
}

impl<'de> Deserialize<'de> for ParameterId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
