//! Typed value conversion for parameter filters.
//!
//! Record attributes and filter comparands arrive in loosely related
//! runtime types: strings typed by a user, integers, doubles, booleans,
//! timestamps, element references and workset owners. This crate makes the
//! kind of every value explicit ([`Value`] / [`ValueKind`]) and converts
//! between kinds through a [`ConverterRegistry`]:
//!
//! - identity when the source already has the target kind,
//! - registered converters keyed by kind pair, first success wins,
//! - a generic invariant numeric/string coercion as the last resort.
//!
//! Strings destined for numeric targets may be unit expressions such as
//! `3.5m` or `=2ft+6in`; see [`expr`].
//!
//! # Quick Start
//!
//! ```rust
//! use sifter_convert::{ConverterRegistry, ConvertContext, LengthUnit, Value, ValueKind};
//!
//! let registry = ConverterRegistry::with_builtins();
//! let ctx = ConvertContext::for_unit(LengthUnit::Inches);
//!
//! // Bare numbers follow the display unit: 30 inches is 2.5 feet.
//! let v = registry.try_convert(&Value::from("=30"), ValueKind::Double, &ctx).unwrap();
//! assert_eq!(v, Value::Double(2.5));
//! ```

mod builtin;
mod error;
pub mod expr;
mod registry;
mod units;
mod value;

pub use builtin::{format_round_trip, parse_number, parse_round_trip};
pub use error::{ConvertError, ExprError, Result};
pub use registry::{ConvertContext, ConverterFn, ConverterRegistry};
pub use units::{
    LengthUnit, FEET_PER_CENTIMETER, FEET_PER_INCH, FEET_PER_METER, FEET_PER_MILLIMETER,
};
pub use value::{ElementId, Target, Value, ValueKind, WorksetId};
