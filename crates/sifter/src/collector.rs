//! Fluent query facade over a [`RecordStore`].
//!
//! A [`Collector`] accumulates narrowing steps and filter conditions without
//! touching the store. Each terminal ([`iter`](Collector::iter),
//! [`to_vec`](Collector::to_vec), [`count`](Collector::count), ...) asks the
//! store for a fresh sequence, so a collector can be run more than once.

use std::collections::BTreeSet;

use sifter_convert::{ElementId, Value};
use sifter_filter::{FilterSet, FilterSetBuilder, Logic, RuleFactory, StorageKind, StringOp};
use sifter_params::{ByteStore, ParameterId};

use crate::cache::MetadataCache;
use crate::error::Result;
use crate::record::Element;
use crate::store::{RecordSeq, RecordStore, ReleaseGuard};

#[derive(Debug, Clone, PartialEq)]
enum Restriction {
    Kind(String),
    Instances,
    Types,
    Category(ElementId),
    Categories(BTreeSet<ElementId>),
}

/// Query over the records of a store.
///
/// Every narrowing call returns the collector. Conditions are AND-ed at the
/// top level.
///
/// # Example
///
/// ```
/// use sifter::{Collector, MemoryElement, MemoryStore};
/// use sifter_convert::ElementId;
/// use sifter_filter::{StorageKind, StringOp};
///
/// let store = MemoryStore::new()
///     .with_element(
///         MemoryElement::instance(ElementId(1), "Door")
///             .in_category(ElementId(23))
///             .with(-1001, StorageKind::String, "D-101"),
///     )
///     .with_element(
///         MemoryElement::instance(ElementId(2), "Door")
///             .in_category(ElementId(23))
///             .with(-1001, StorageKind::String, "D-205"),
///     );
///
/// let doors = Collector::new(&store)
///     .of_category(ElementId(23))
///     .instances()
///     .where_rule(-1001, StringOp::Wildcard, "d-1*");
///
/// assert_eq!(doors.ids(), vec![ElementId(1)]);
/// assert_eq!(doors.count(), 1);
/// ```
pub struct Collector<'s, S: RecordStore> {
    store: &'s S,
    restrictions: Vec<Restriction>,
    filter: FilterSetBuilder,
}

impl<'s, S: RecordStore> Collector<'s, S> {
    /// Creates a collector with the default rule factory.
    pub fn new(store: &'s S) -> Self {
        Self::with_factory(store, RuleFactory::default())
    }

    /// Creates a collector whose conditions are built by `factory`.
    pub fn with_factory(store: &'s S, factory: RuleFactory) -> Self {
        Collector {
            store,
            restrictions: Vec::new(),
            filter: FilterSetBuilder::with_factory(factory, Logic::And),
        }
    }

    // ========================================================================
    // Sequence restrictions
    // ========================================================================

    pub fn of_kind(mut self, kind: impl Into<String>) -> Self {
        self.restrictions.push(Restriction::Kind(kind.into()));
        self
    }

    pub fn instances(mut self) -> Self {
        self.restrictions.push(Restriction::Instances);
        self
    }

    pub fn types(mut self) -> Self {
        self.restrictions.push(Restriction::Types);
        self
    }

    pub fn of_category(mut self, category: ElementId) -> Self {
        self.restrictions.push(Restriction::Category(category));
        self
    }

    pub fn of_categories<I>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = ElementId>,
    {
        self.restrictions
            .push(Restriction::Categories(categories.into_iter().collect()));
        self
    }

    // ========================================================================
    // Attribute conditions
    // ========================================================================

    /// Keeps records where `param op value` holds.
    pub fn where_rule(
        mut self,
        param: impl Into<ParameterId>,
        op: StringOp,
        value: impl Into<Value>,
    ) -> Self {
        self.filter = self.filter.rule(param, op, value);
        self
    }

    /// Keeps records where `param op value` holds, converting `value` to
    /// the attribute's storage kind first.
    pub fn where_typed(
        mut self,
        param: impl Into<ParameterId>,
        storage: StorageKind,
        op: StringOp,
        value: impl Into<Value>,
    ) -> Self {
        self.filter = self.filter.typed_rule(param, storage, op, value);
        self
    }

    /// Keeps records matching any of the conditions.
    pub fn where_or<I, P, V>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = (P, StringOp, V)>,
        P: Into<ParameterId>,
        V: Into<Value>,
    {
        self.filter = self.filter.or_rules(conditions);
        self
    }

    /// Keeps records matching all of the conditions.
    pub fn where_and<I, P, V>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = (P, StringOp, V)>,
        P: Into<ParameterId>,
        V: Into<Value>,
    {
        self.filter = self.filter.and_rules(conditions);
        self
    }

    /// Keeps records where `param op v` holds for any of `values`.
    pub fn where_or_values<I, V>(mut self, param: impl Into<ParameterId>, op: StringOp, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.filter = self.filter.or_values(param, op, values);
        self
    }

    /// Keeps records where `param op v` holds for all of `values`.
    pub fn where_and_values<I, V>(mut self, param: impl Into<ParameterId>, op: StringOp, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.filter = self.filter.and_values(param, op, values);
        self
    }

    /// Keeps records accepted by a prebuilt filter set.
    pub fn where_passes(mut self, set: FilterSet) -> Self {
        self.filter = self.filter.child(set);
        self
    }

    /// Keeps records accepted by a nested set built in `configure`.
    pub fn where_with<F>(mut self, logic: Logic, configure: F) -> Self
    where
        F: FnOnce(FilterSetBuilder) -> FilterSetBuilder,
    {
        self.filter = match logic {
            Logic::And => self.filter.and_set(configure),
            Logic::Or => self.filter.or_set(configure),
        };
        self
    }

    /// Keeps records where the condition holds for any parameter named
    /// `name`.
    ///
    /// A display name can belong to several parameters: a built-in one and
    /// project or shared definitions. All of them are tried. When the cache
    /// knows no parameter by that name, the name itself is used as the
    /// identifier.
    ///
    /// # Errors
    ///
    /// Fails when `name` is empty, since no parameter can carry it.
    pub fn where_named<B: ByteStore>(
        mut self,
        cache: &MetadataCache<B>,
        name: &str,
        op: StringOp,
        value: impl Into<Value>,
    ) -> Result<Self> {
        let mut ids = cache.ids_named(self.store, name);
        if ids.is_empty() {
            ids.push(ParameterId::name(name)?);
        }
        let value = value.into();
        self.filter = self.filter.or_rules(
            ids.into_iter()
                .map(|id| (id, op, value.clone()))
                .collect::<Vec<_>>(),
        );
        Ok(self)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// The filter set built so far.
    pub fn filter_set(&self) -> FilterSet {
        self.filter.clone().build()
    }

    // ========================================================================
    // Terminals
    // ========================================================================

    /// A fresh sequence over the matching records.
    pub fn iter(&self) -> RecordSeq<'s, S::Record> {
        let mut seq = self.store.records();
        for restriction in &self.restrictions {
            seq = match restriction {
                Restriction::Kind(kind) => seq.restrict_by_kind(kind.clone()),
                Restriction::Instances => seq.restrict_to_instances(),
                Restriction::Types => seq.restrict_to_types(),
                Restriction::Category(c) => seq.restrict_by_category(*c),
                Restriction::Categories(cs) => seq.restrict_by_categories(cs.clone()),
            };
        }
        seq.apply_predicate(self.filter_set().compile())
    }

    pub fn to_vec(&self) -> Vec<&'s S::Record> {
        self.iter().collect()
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.iter().map(|r| r.id()).collect()
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn first(&self) -> Option<&'s S::Record> {
        self.iter().next()
    }

    pub fn any(&self) -> bool {
        self.first().is_some()
    }

    /// Calls `f` on every matching record, releasing each record right
    /// after, including when `f` panics.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&S::Record),
    {
        for record in self.iter() {
            let _release = ReleaseGuard(record);
            f(record);
        }
    }
}

impl<S: RecordStore> Clone for Collector<'_, S> {
    fn clone(&self) -> Self {
        Collector {
            store: self.store,
            restrictions: self.restrictions.clone(),
            filter: self.filter.clone(),
        }
    }
}

impl<S: RecordStore> std::fmt::Debug for Collector<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("restrictions", &self.restrictions)
            .field("filter", &self.filter_set().to_string())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    use super::*;
    use crate::error::SifterError;
    use crate::memory::{MemoryElement, MemoryStore};
    use sifter_params::MemoryByteStore;

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_element(
                MemoryElement::type_record(ElementId(1), "WallType")
                    .in_category(ElementId(100))
                    .with(-1001, StorageKind::String, "Generic"),
            )
            .with_element(
                MemoryElement::instance(ElementId(2), "Wall")
                    .in_category(ElementId(100))
                    .with_type(ElementId(1))
                    .with(-1001, StorageKind::String, "W-1")
                    .with(-1002, StorageKind::Double, 3.0),
            )
            .with_element(
                MemoryElement::instance(ElementId(3), "Wall")
                    .in_category(ElementId(100))
                    .with_type(ElementId(1))
                    .with(-1001, StorageKind::String, "W-2")
                    .with(-1002, StorageKind::Double, 1.5),
            )
            .with_element(
                MemoryElement::instance(ElementId(4), "Door")
                    .in_category(ElementId(200))
                    .with(-1001, StorageKind::String, "D-1"),
            )
    }

    #[test]
    fn restrictions_compose() {
        let store = store();
        assert_eq!(Collector::new(&store).count(), 4);
        assert_eq!(Collector::new(&store).instances().count(), 3);
        assert_eq!(Collector::new(&store).types().ids(), vec![ElementId(1)]);
        assert_eq!(
            Collector::new(&store).of_kind("Wall").ids(),
            vec![ElementId(2), ElementId(3)]
        );
        assert_eq!(
            Collector::new(&store)
                .of_categories([ElementId(100), ElementId(200)])
                .instances()
                .count(),
            3
        );
    }

    #[test]
    fn conditions_narrow() {
        let store = store();
        let walls = Collector::new(&store)
            .of_category(ElementId(100))
            .where_rule(-1002, StringOp::Greater, 2.0);
        assert_eq!(walls.ids(), vec![ElementId(2)]);

        let either = Collector::new(&store)
            .where_or_values(-1001, StringOp::Equals, ["w-2", "d-1"]);
        assert_eq!(either.ids(), vec![ElementId(3), ElementId(4)]);

        let both = Collector::new(&store).where_and([
            (-1001, StringOp::BeginsWith, Value::from("w")),
            (-1002, StringOp::Less, Value::from(2.0)),
        ]);
        assert_eq!(both.ids(), vec![ElementId(3)]);

        let or = Collector::new(&store).where_or([
            (-1001, StringOp::Equals, "D-1"),
            (-1001, StringOp::Equals, "Generic"),
        ]);
        assert_eq!(or.ids(), vec![ElementId(1), ElementId(4)]);
    }

    #[test]
    fn typed_conditions_convert_expressions() {
        let store = store();
        let c = Collector::new(&store).where_typed(
            -1002,
            StorageKind::Double,
            StringOp::Greater,
            "=1ft+6in",
        );
        assert_eq!(c.ids(), vec![ElementId(2)]);
    }

    #[test]
    fn builder_callback_and_prebuilt_sets() {
        let store = store();
        let c = Collector::new(&store).where_with(Logic::Or, |b| {
            b.rule(-1001, StringOp::EndsWith, "-1")
                .rule(-1002, StringOp::Equals, 1.5)
        });
        assert_eq!(c.ids(), vec![ElementId(2), ElementId(3), ElementId(4)]);

        let set = FilterSetBuilder::and()
            .rule(-1001, StringOp::Contains, "d")
            .build();
        assert_eq!(Collector::new(&store).where_passes(set).ids(), vec![ElementId(4)]);
    }

    #[test]
    fn terminals_requery() {
        let store = store();
        let c = Collector::new(&store).of_kind("Wall");
        assert_eq!(c.count(), 2);
        assert_eq!(c.count(), 2);
        assert_eq!(c.first().map(|r| r.id()), Some(ElementId(2)));
        assert!(c.any());
        assert_eq!(c.to_vec().len(), 2);
        assert!(!Collector::new(&store).of_kind("Roof").any());
    }

    #[test]
    fn for_each_releases_every_record() {
        let store = store();
        let mut seen = Vec::new();
        Collector::new(&store)
            .instances()
            .for_each(|r| seen.push(r.id()));
        assert_eq!(seen.len(), 3);
        for id in seen {
            assert_eq!(store.get(id).unwrap().release_count(), 1);
        }
        assert_eq!(store.get(ElementId(1)).unwrap().release_count(), 0);
    }

    #[test]
    fn for_each_releases_on_panic() {
        let store = store();
        let result = catch_unwind(AssertUnwindSafe(|| {
            Collector::new(&store).of_kind("Door").for_each(|_| panic!("boom"));
        }));
        assert!(result.is_err());
        assert_eq!(store.get(ElementId(4)).unwrap().release_count(), 1);
    }

    #[test]
    fn where_named_tries_every_id() {
        let project_mark = ParameterId::from_parts(None, None, Some(9), Some("Mark")).unwrap();
        let store = MemoryStore::new()
            .with_element(
                MemoryElement::instance(ElementId(5), "Room")
                    .in_category(ElementId(300))
                    .with(project_mark.clone(), StorageKind::String, "R-1"),
            )
            .with_element(
                MemoryElement::instance(ElementId(6), "Door")
                    .in_category(ElementId(200))
                    .with(
                        ParameterId::builtin_named(-1001, "Mark").unwrap(),
                        StorageKind::String,
                        "R-2",
                    ),
            )
            .with_element(
                MemoryElement::instance(ElementId(7), "Door")
                    .in_category(ElementId(200))
                    .with(-1001, StorageKind::String, "D-3"),
            )
            .with_definition(project_mark);

        let cache = MetadataCache::new(MemoryByteStore::new(), "c", "1");
        let c = Collector::new(&store).where_named(&cache, "Mark", StringOp::BeginsWith, "r-")
            .unwrap();
        assert_eq!(c.ids(), vec![ElementId(5), ElementId(6)]);

        let unknown = Collector::new(&store)
            .where_named(&cache, "Nope", StringOp::Equals, "x")
            .unwrap();
        assert_eq!(unknown.count(), 0);
        assert_eq!(unknown.filter_set().total_predicates(), 1);
    }

    #[test]
    fn where_named_rejects_empty_name() {
        let store = MemoryStore::new()
            .with_element(
                MemoryElement::instance(ElementId(1), "Door").with(-1001, StorageKind::String, "a"),
            )
            .with_element(
                MemoryElement::instance(ElementId(2), "Door").with(-1001, StorageKind::String, "b"),
            );
        let cache = MetadataCache::new(MemoryByteStore::new(), "c", "1");

        let result = Collector::new(&store).where_named(&cache, "", StringOp::Equals, "zzz");
        assert!(matches!(result, Err(SifterError::Param(_))));
    }
}
