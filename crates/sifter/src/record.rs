//! The record abstraction the engine evaluates against.

use sifter_convert::ElementId;
use sifter_filter::{Attributed, StorageKind};
use sifter_params::ParameterId;

/// Describes one attribute a record carries.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeInfo {
    pub id: ParameterId,
    pub storage: StorageKind,
    pub read_only: bool,
}

/// A record in a [`RecordStore`](crate::RecordStore).
///
/// Records are either instances or type records. An instance may refer to
/// the type record it was made from, whose attributes are shared by every
/// instance of that type.
pub trait Element: Attributed {
    /// Identity of this record.
    fn id(&self) -> ElementId;

    /// The type record this instance was made from.
    fn type_id(&self) -> Option<ElementId>;

    /// Category tag, if the record has one.
    fn category(&self) -> Option<ElementId>;

    /// Declared kind tag, e.g. `"Wall"` or `"FamilyInstance"`.
    fn kind(&self) -> &str;

    /// Returns `true` for type records.
    fn is_type(&self) -> bool;

    /// Name of the user or workset owning this record, if any.
    fn owner(&self) -> Option<&str>;

    /// The attributes this record carries.
    fn parameters(&self) -> Vec<AttributeInfo>;

    /// Releases transient resources held by this record.
    ///
    /// Called once per record after the callback of
    /// [`Collector::for_each`](crate::Collector::for_each) returns or
    /// unwinds.
    fn release(&self) {}
}
