//! Side store linking records to spatial regions.
//!
//! A record can be associated with a room or space per phase, either by
//! naming the region record directly or by a point that a
//! [`RegionLocator`] resolves to a region when asked.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sifter_convert::ElementId;

use crate::store::RecordStore;

/// The kind of region a record can be associated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Room,
    Space,
}

impl RegionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RegionKind::Room => "room",
            RegionKind::Space => "space",
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A location in model coordinates (feet).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Point { x, y, z }
    }
}

/// What an association points at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssociationTarget {
    /// A region record, by id.
    Element(ElementId),
    /// A point, resolved to a region on lookup.
    Point(Point),
}

/// One association of a record with a region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub kind: RegionKind,
    /// Phase the association applies to. `None` is a bucket of its own,
    /// not a wildcard.
    pub phase: Option<ElementId>,
    pub target: AssociationTarget,
}

impl Association {
    fn is_slot(&self, kind: RegionKind, phase: Option<ElementId>) -> bool {
        self.kind == kind && self.phase == phase
    }
}

/// Finds the region of a given kind containing a point.
pub trait RegionLocator {
    fn region_at(&self, kind: RegionKind, point: Point, phase: Option<ElementId>) -> Option<ElementId>;
}

impl<F> RegionLocator for F
where
    F: Fn(RegionKind, Point, Option<ElementId>) -> Option<ElementId>,
{
    fn region_at(&self, kind: RegionKind, point: Point, phase: Option<ElementId>) -> Option<ElementId> {
        self(kind, point, phase)
    }
}

/// Associations keyed by the record they belong to.
///
/// At most one association exists per `(record, kind, phase)`.
///
/// # Example
///
/// ```
/// use sifter::{
///     AssociationStore, AssociationTarget, Element, MemoryElement, MemoryStore, Point,
///     RegionKind,
/// };
/// use sifter_convert::ElementId;
///
/// let store = MemoryStore::new()
///     .with_element(MemoryElement::instance(ElementId(50), "Room"));
/// let no_regions = |_: RegionKind, _: Point, _: Option<ElementId>| -> Option<ElementId> { None };
///
/// let mut links = AssociationStore::new();
/// links.set(ElementId(7), RegionKind::Room, None, AssociationTarget::Element(ElementId(50)));
///
/// let room = links.resolve(&store, &no_regions, ElementId(7), RegionKind::Room, None);
/// assert_eq!(room.map(|r| r.kind()), Some("Room"));
///
/// // A different phase is a different slot.
/// assert!(links.get(ElementId(7), RegionKind::Room, Some(ElementId(2))).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssociationStore {
    entries: BTreeMap<ElementId, Vec<Association>>,
}

impl AssociationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `element` with `target` for `(kind, phase)`, returning the
    /// target it replaces.
    pub fn set(
        &mut self,
        element: ElementId,
        kind: RegionKind,
        phase: Option<ElementId>,
        target: AssociationTarget,
    ) -> Option<AssociationTarget> {
        let slots = self.entries.entry(element).or_default();
        match slots.iter_mut().find(|a| a.is_slot(kind, phase)) {
            Some(existing) => Some(std::mem::replace(&mut existing.target, target)),
            None => {
                slots.push(Association {
                    kind,
                    phase,
                    target,
                });
                None
            }
        }
    }

    /// The stored target for `(kind, phase)`, unresolved.
    pub fn get(
        &self,
        element: ElementId,
        kind: RegionKind,
        phase: Option<ElementId>,
    ) -> Option<AssociationTarget> {
        self.entries
            .get(&element)?
            .iter()
            .find(|a| a.is_slot(kind, phase))
            .map(|a| a.target)
    }

    /// The region record for `(kind, phase)`.
    ///
    /// Element targets are looked up in `store`. Point targets are first
    /// turned into a region id by `locator`.
    pub fn resolve<'s, S, L>(
        &self,
        store: &'s S,
        locator: &L,
        element: ElementId,
        kind: RegionKind,
        phase: Option<ElementId>,
    ) -> Option<&'s S::Record>
    where
        S: RecordStore,
        L: RegionLocator + ?Sized,
    {
        let region = match self.get(element, kind, phase)? {
            AssociationTarget::Element(id) => id,
            AssociationTarget::Point(point) => locator.region_at(kind, point, phase)?,
        };
        store.get(region)
    }

    /// Removes the association for `(kind, phase)`.
    pub fn remove(
        &mut self,
        element: ElementId,
        kind: RegionKind,
        phase: Option<ElementId>,
    ) -> Option<AssociationTarget> {
        let slots = self.entries.get_mut(&element)?;
        let index = slots.iter().position(|a| a.is_slot(kind, phase))?;
        let removed = slots.remove(index);
        if slots.is_empty() {
            self.entries.remove(&element);
        }
        Some(removed.target)
    }

    /// Removes every association of `element`.
    pub fn remove_all(&mut self, element: ElementId) -> Vec<Association> {
        self.entries.remove(&element).unwrap_or_default()
    }

    /// Every association of `element`, in insertion order.
    pub fn associations(&self, element: ElementId) -> &[Association] {
        self.entries.get(&element).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of records with at least one association.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryElement, MemoryStore};
    use crate::record::Element;

    const PHASE: Option<ElementId> = Some(ElementId(3));

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_element(MemoryElement::instance(ElementId(50), "Room"))
            .with_element(MemoryElement::instance(ElementId(60), "Space"))
    }

    fn locate(kind: RegionKind, point: Point, _phase: Option<ElementId>) -> Option<ElementId> {
        match kind {
            RegionKind::Room if point.x < 10.0 => Some(ElementId(50)),
            RegionKind::Space => Some(ElementId(60)),
            _ => None,
        }
    }

    #[test]
    fn set_upserts_per_kind_and_phase() {
        let mut links = AssociationStore::new();
        let a = AssociationTarget::Element(ElementId(50));
        let b = AssociationTarget::Point(Point::new(1.0, 2.0, 0.0));

        assert_eq!(links.set(ElementId(7), RegionKind::Room, PHASE, a), None);
        assert_eq!(links.set(ElementId(7), RegionKind::Room, None, b), None);
        assert_eq!(links.set(ElementId(7), RegionKind::Space, PHASE, b), None);
        assert_eq!(links.set(ElementId(7), RegionKind::Room, PHASE, b), Some(a));

        assert_eq!(links.associations(ElementId(7)).len(), 3);
        assert_eq!(links.get(ElementId(7), RegionKind::Room, PHASE), Some(b));
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn none_phase_is_its_own_bucket() {
        let mut links = AssociationStore::new();
        links.set(
            ElementId(7),
            RegionKind::Room,
            None,
            AssociationTarget::Element(ElementId(50)),
        );
        assert!(links.get(ElementId(7), RegionKind::Room, PHASE).is_none());
        assert!(links.get(ElementId(7), RegionKind::Room, None).is_some());
    }

    #[test]
    fn resolve_elements_and_points() {
        let store = store();
        let mut links = AssociationStore::new();
        links.set(
            ElementId(7),
            RegionKind::Room,
            PHASE,
            AssociationTarget::Element(ElementId(50)),
        );
        links.set(
            ElementId(8),
            RegionKind::Room,
            PHASE,
            AssociationTarget::Point(Point::new(4.0, 0.0, 0.0)),
        );
        links.set(
            ElementId(9),
            RegionKind::Room,
            PHASE,
            AssociationTarget::Point(Point::new(40.0, 0.0, 0.0)),
        );
        links.set(
            ElementId(9),
            RegionKind::Space,
            PHASE,
            AssociationTarget::Point(Point::default()),
        );

        let id = |e| {
            links
                .resolve(&store, &locate, e, RegionKind::Room, PHASE)
                .map(|r| r.id())
        };
        assert_eq!(id(ElementId(7)), Some(ElementId(50)));
        assert_eq!(id(ElementId(8)), Some(ElementId(50)));
        assert_eq!(id(ElementId(9)), None);
        assert_eq!(id(ElementId(10)), None);

        let space = links.resolve(&store, &locate, ElementId(9), RegionKind::Space, PHASE);
        assert_eq!(space.map(|r| r.kind()), Some("Space"));
    }

    #[test]
    fn dangling_element_target_resolves_to_none() {
        let store = store();
        let mut links = AssociationStore::new();
        links.set(
            ElementId(7),
            RegionKind::Room,
            None,
            AssociationTarget::Element(ElementId(999)),
        );
        assert!(links
            .resolve(&store, &locate, ElementId(7), RegionKind::Room, None)
            .is_none());
    }

    #[test]
    fn remove_drops_empty_entries() {
        let mut links = AssociationStore::new();
        let target = AssociationTarget::Element(ElementId(50));
        links.set(ElementId(7), RegionKind::Room, None, target);
        links.set(ElementId(7), RegionKind::Space, None, target);

        assert_eq!(links.remove(ElementId(7), RegionKind::Room, None), Some(target));
        assert_eq!(links.remove(ElementId(7), RegionKind::Room, None), None);
        assert_eq!(links.len(), 1);
        assert_eq!(links.remove_all(ElementId(7)).len(), 1);
        assert!(links.is_empty());
        assert!(links.associations(ElementId(7)).is_empty());
    }
}
