//! Sifter filter - typed rules and nested AND/OR filter sets.
//!
//! This crate turns `(parameter, operator, value)` conditions into typed
//! rules and combines them into trees that are evaluated against any record
//! implementing [`Attributed`]. It supports:
//!
//! - Typed rules: case-insensitive strings, integers, doubles with
//!   tolerance, element references
//! - Wildcard patterns expanded into prefix/contains/suffix rules
//! - Arbitrarily nested AND/OR sets with short-circuit evaluation
//! - Comparand normalization through a [`ConverterRegistry`](sifter_convert::ConverterRegistry),
//!   including unit expressions such as `=2ft+6in`
//!
//! # Quick Start
//!
//! ```rust
//! use sifter_filter::{AttrValue, Attributed, FilterSetBuilder, StringOp};
//! use sifter_params::ParameterId;
//!
//! struct Door {
//!     mark: String,
//!     width: f64,
//! }
//!
//! impl Attributed for Door {
//!     fn attribute(&self, id: &ParameterId) -> AttrValue<'_> {
//!         match id.key_value() {
//!             Some(1) => AttrValue::String(&self.mark),
//!             Some(2) => AttrValue::Double(self.width),
//!             _ => AttrValue::None,
//!         }
//!     }
//! }
//!
//! let doors = vec![
//!     Door { mark: "D-101".into(), width: 3.0 },
//!     Door { mark: "D-102".into(), width: 2.5 },
//!     Door { mark: "W-201".into(), width: 3.0 },
//! ];
//!
//! let set = FilterSetBuilder::and()
//!     .rule(1, StringOp::Wildcard, "d-*")
//!     .rule(2, StringOp::GreaterOrEqual, 3.0)
//!     .build();
//!
//! let hits = set.filter(&doors);
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].mark, "D-101");
//! ```
//!
//! # Evaluation Semantics
//!
//! ```text
//! node = AND/OR over (its rules ++ its non-empty children), left to right
//! no predicates anywhere below  → true for every record
//! exactly one predicate         → that predicate, whatever the node logic
//! ```
//!
//! A missing attribute, or one whose kind does not fit the rule, never
//! matches, negated operators included.
//!
//! # Operators by Comparand Kind
//!
//! | Kind | Operators |
//! |------|-----------|
//! | String | all [`StringOp`]s |
//! | Integer, Double | [`ValueOp`]s; text operators compare the decimal string |
//! | Bool, Workset | as Integer |
//! | DateTime | as its round-trip ISO-8601 string |
//! | ElementId | `Equals`, `NotEquals` |

mod builder;
mod error;
mod factory;
mod op;
mod rule;
mod set;
mod value;

// Re-export public API
pub use builder::FilterSetBuilder;
pub use error::{FilterError, Result};
pub use factory::{RuleFactory, DEFAULT_DOUBLE_TOLERANCE};
pub use op::{StringOp, ValueOp};
pub use rule::{FilterRule, RuleTest};
pub use set::{FilterSet, Logic, Predicate};
pub use value::{compare_with_tolerance, AttrValue, Attributed, StorageKind};
