//! Type-pair keyed converter registry.
//!
//! [`ConverterRegistry::try_convert`] resolves a conversion in four steps:
//!
//! ```text
//! null source      → Ok(Null) if the target is nullable, else error
//! same kind        → identity
//! registered pairs → first converter (in registration order) that succeeds
//! fallback         → generic invariant numeric/string coercion
//! ```
//!
//! Registration order matters. When two converters are registered for the
//! same pair, the earlier one is asked first and the later one only runs if
//! the earlier declines.

use std::fmt;

use tracing::trace;

use crate::builtin;
use crate::error::{ConvertError, Result};
use crate::units::LengthUnit;
use crate::value::{Target, Value, ValueKind};

/// Converter function type. Returns `None` to decline.
pub type ConverterFn = Box<dyn Fn(&Value, &ConvertContext) -> Option<Value> + Send + Sync>;

/// Ambient information a conversion may need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertContext {
    /// Internal units per bare number typed by the user.
    pub default_unit_scale: f64,
}

impl ConvertContext {
    /// Context whose bare numbers are in the given display unit.
    pub fn for_unit(unit: LengthUnit) -> Self {
        ConvertContext {
            default_unit_scale: unit.feet_per_unit(),
        }
    }
}

impl Default for ConvertContext {
    fn default() -> Self {
        ConvertContext::for_unit(LengthUnit::Feet)
    }
}

struct Registration {
    from: ValueKind,
    to: ValueKind,
    convert: ConverterFn,
}

/// Registry of converters keyed by `(source kind, target kind)`.
///
/// # Example
///
/// ```
/// use sifter_convert::{ConverterRegistry, ConvertContext, Value, ValueKind};
///
/// let registry = ConverterRegistry::with_builtins();
/// let ctx = ConvertContext::default();
///
/// let one = registry.try_convert(&Value::Bool(true), ValueKind::Integer, &ctx).unwrap();
/// assert_eq!(one, Value::Integer(1));
///
/// let feet = registry.try_convert(&Value::from("=2ft+6in"), ValueKind::Double, &ctx).unwrap();
/// assert_eq!(feet, Value::Double(2.5));
/// ```
#[derive(Default)]
pub struct ConverterRegistry {
    converters: Vec<Registration>,
}

impl ConverterRegistry {
    /// Creates an empty registry. Only identity and fallback coercion apply.
    pub fn new() -> Self {
        ConverterRegistry::default()
    }

    /// Creates a registry preloaded with the built-in converters.
    pub fn with_builtins() -> Self {
        let mut registry = ConverterRegistry::new();
        builtin::register_builtins(&mut registry);
        registry
    }

    /// Registers a converter for a kind pair.
    ///
    /// Converters for the same pair are consulted in registration order.
    pub fn register<F>(&mut self, from: ValueKind, to: ValueKind, convert: F) -> &mut Self
    where
        F: Fn(&Value, &ConvertContext) -> Option<Value> + Send + Sync + 'static,
    {
        self.converters.push(Registration {
            from,
            to,
            convert: Box::new(convert),
        });
        self
    }

    /// Number of registered converters.
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Returns `true` if no converters are registered.
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Returns `true` if at least one converter is registered for the pair.
    pub fn has_converter(&self, from: ValueKind, to: ValueKind) -> bool {
        self.converters
            .iter()
            .any(|r| r.from == from && r.to == to)
    }

    /// Converts `value` to `target`.
    pub fn try_convert(
        &self,
        value: &Value,
        target: impl Into<Target>,
        ctx: &ConvertContext,
    ) -> Result<Value> {
        let target = target.into();

        let Some(from) = value.kind() else {
            return if target.nullable {
                Ok(Value::Null)
            } else {
                Err(ConvertError::NullNotAllowed {
                    target: target.kind,
                })
            };
        };

        if from == target.kind {
            return Ok(value.clone());
        }

        let hit = self
            .converters
            .iter()
            .filter(|r| r.from == from && r.to == target.kind)
            .find_map(|r| (r.convert)(value, ctx));
        if let Some(converted) = hit {
            trace!(%from, to = %target.kind, "converted via registry");
            return Ok(converted);
        }

        builtin::coerce(value, target.kind)
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<(ValueKind, ValueKind)> =
            self.converters.iter().map(|r| (r.from, r.to)).collect();
        f.debug_struct("ConverterRegistry")
            .field("converters", &pairs)
            .finish()
    }
}
