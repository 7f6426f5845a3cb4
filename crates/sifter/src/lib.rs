//! Sifter - typed parameter filters over record stores.
//!
//! Sifter queries a host's records through a fluent [`Collector`]. The host
//! provides records and stores through the [`Element`] and [`RecordStore`]
//! traits; sifter provides:
//!
//! - Narrowing by kind, category and instance/type flag
//! - Typed attribute conditions combined into nested AND/OR sets
//!   (see [`sifter_filter`])
//! - Lookup of parameters by display name through a persisted
//!   [`MetadataCache`]
//! - A side store of room/space [associations](AssociationStore)
//! - Attribute writes that convert values and respect read-only and
//!   ownership rules ([`MemoryStore::set_attribute`])
//!
//! # Quick Start
//!
//! ```rust
//! use sifter::{Collector, MemoryElement, MemoryStore, Settings};
//! use sifter_convert::ElementId;
//! use sifter_filter::{StorageKind, StringOp};
//!
//! let walls = ElementId(-2000011);
//! let store = MemoryStore::new()
//!     .with_element(
//!         MemoryElement::instance(ElementId(1), "Wall")
//!             .in_category(walls)
//!             .with(-1001, StorageKind::String, "Exterior")
//!             .with(-1002, StorageKind::Double, 2.5),
//!     )
//!     .with_element(
//!         MemoryElement::instance(ElementId(2), "Wall")
//!             .in_category(walls)
//!             .with(-1001, StorageKind::String, "Interior")
//!             .with(-1002, StorageKind::Double, 0.5),
//!     );
//!
//! let settings = Settings::from_yaml_str("display_unit: inches\n").unwrap();
//!
//! // "=30" is 30 inches, i.e. 2.5 feet.
//! let thick = Collector::with_factory(&store, settings.rule_factory().unwrap())
//!     .of_category(walls)
//!     .instances()
//!     .where_typed(-1002, StorageKind::Double, StringOp::GreaterOrEqual, "=30")
//!     .where_or_values(-1001, StringOp::Contains, ["ext", "curtain"]);
//!
//! assert_eq!(thick.ids(), vec![ElementId(1)]);
//! ```
//!
//! Untyped conditions ([`Collector::where_rule`]) pick the rule kind from the
//! comparand, so `"=30"` would be compared as text. Typed conditions
//! ([`Collector::where_typed`], [`FilterSetBuilder::typed_rule`]) convert the
//! comparand to the attribute's storage kind first.
//!
//! # Query Semantics
//!
//! ```text
//! result = records
//!        ∩ every restriction (kind, category, instances/types)
//!        ∩ records accepted by the AND of every where_* condition
//! ```
//!
//! - Conditions on attributes a record lacks never match.
//! - A collector with no conditions yields every restricted record.
//! - Every terminal (`iter`, `count`, `ids`, ...) queries the store again.
//!
//! [`FilterSetBuilder::typed_rule`]: sifter_filter::FilterSetBuilder::typed_rule

mod association;
mod cache;
mod collector;
mod error;
mod memory;
mod record;
mod settings;
mod store;

// Re-export public API
pub use association::{
    Association, AssociationStore, AssociationTarget, Point, RegionKind, RegionLocator,
};
pub use cache::{CacheStatus, MetadataCache, CACHE_FILE_NAME};
pub use collector::Collector;
pub use error::{AttributeError, Result, SifterError};
pub use memory::{MemoryAttribute, MemoryElement, MemoryStore, RecordingScope, ScopeEvent};
pub use record::{AttributeInfo, Element};
pub use settings::{DisplayUnit, Settings};
pub use store::{MutationScope, RecordSeq, RecordStore, ScopeGuard};
