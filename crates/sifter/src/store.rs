//! Record store, record sequence and mutation scope abstractions.
//!
//! The engine never owns records. A [`RecordStore`] hands out single-pass
//! [`RecordSeq`]s that can be narrowed before iteration, and opens
//! [`MutationScope`]s for work that must be rolled back.

use std::collections::BTreeSet;

use sifter_convert::ElementId;
use sifter_filter::Predicate;
use sifter_params::ParameterId;
use tracing::warn;

use crate::error::Result;
use crate::record::Element;

/// Provider of records.
pub trait RecordStore {
    type Record: Element;

    /// A fresh sequence over every record.
    fn records(&self) -> RecordSeq<'_, Self::Record>;

    /// Looks up a record by id.
    fn get(&self, id: ElementId) -> Option<&Self::Record>;

    /// Every category tag used by some record.
    fn categories(&self) -> Vec<ElementId>;

    /// One record standing in for `category`, for attribute discovery.
    fn representative(&self, category: ElementId) -> Option<&Self::Record>;

    /// Project and shared parameter definitions declared in the store.
    fn parameter_definitions(&self) -> Vec<ParameterId>;

    /// Opens a mutation scope. The scope is not started yet.
    fn open_scope(&self, label: &str) -> Box<dyn MutationScope + '_>;
}

/// A single-pass sequence of records that can be narrowed.
///
/// Each `restrict_*` call consumes the sequence and returns the narrowed
/// one. Nothing is evaluated until iteration.
pub struct RecordSeq<'a, R: 'a> {
    inner: Box<dyn Iterator<Item = &'a R> + 'a>,
}

impl<'a, R: Element + 'a> RecordSeq<'a, R> {
    pub fn new(iter: impl Iterator<Item = &'a R> + 'a) -> Self {
        RecordSeq {
            inner: Box::new(iter),
        }
    }

    pub fn restrict_by_kind(self, kind: impl Into<String>) -> Self {
        let kind = kind.into();
        self.retain(move |r| r.kind() == kind)
    }

    pub fn restrict_by_category(self, category: ElementId) -> Self {
        self.retain(move |r| r.category() == Some(category))
    }

    pub fn restrict_by_categories(self, categories: BTreeSet<ElementId>) -> Self {
        self.retain(move |r| r.category().is_some_and(|c| categories.contains(&c)))
    }

    pub fn restrict_to_instances(self) -> Self {
        self.retain(|r| !r.is_type())
    }

    pub fn restrict_to_types(self) -> Self {
        self.retain(|r| r.is_type())
    }

    /// Keeps records the compiled filter accepts.
    pub fn apply_predicate(self, predicate: Predicate) -> Self {
        if predicate.is_accept_all() {
            return self;
        }
        self.retain(move |r| predicate.evaluate(r))
    }

    fn retain<F>(self, mut keep: F) -> Self
    where
        F: FnMut(&R) -> bool + 'a,
    {
        RecordSeq::new(self.inner.filter(move |r| keep(*r)))
    }
}

impl<'a, R: 'a> Iterator for RecordSeq<'a, R> {
    type Item = &'a R;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<'a, R: 'a> std::fmt::Debug for RecordSeq<'a, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordSeq").finish_non_exhaustive()
    }
}

/// A host transaction: changes between `start` and `rollback` are undone.
pub trait MutationScope {
    fn label(&self) -> &str;
    fn start(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;
}

/// A started scope that rolls back when dropped unless committed.
///
/// # Example
///
/// ```
/// use sifter::{MemoryStore, RecordStore, ScopeEvent, ScopeGuard};
///
/// let store = MemoryStore::new();
/// {
///     let _scope = ScopeGuard::start(store.open_scope("probe")).unwrap();
/// }
/// assert_eq!(
///     store.scope_events(),
///     vec![ScopeEvent::Started("probe".into()), ScopeEvent::RolledBack("probe".into())]
/// );
/// ```
pub struct ScopeGuard<'a> {
    scope: Box<dyn MutationScope + 'a>,
    open: bool,
}

impl<'a> ScopeGuard<'a> {
    /// Starts `scope` and guards it.
    pub fn start(mut scope: Box<dyn MutationScope + 'a>) -> Result<Self> {
        scope.start()?;
        Ok(ScopeGuard { scope, open: true })
    }

    pub fn label(&self) -> &str {
        self.scope.label()
    }

    /// Commits the scope.
    pub fn commit(mut self) -> Result<()> {
        self.open = false;
        self.scope.commit()
    }

    /// Rolls the scope back now rather than on drop.
    pub fn rollback(mut self) -> Result<()> {
        self.open = false;
        self.scope.rollback()
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if self.open {
            self.open = false;
            if let Err(err) = self.scope.rollback() {
                warn!(label = self.scope.label(), error = %err, "rollback on drop failed");
            }
        }
    }
}

impl std::fmt::Debug for ScopeGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeGuard")
            .field("label", &self.scope.label())
            .field("open", &self.open)
            .finish()
    }
}

/// Calls [`Element::release`] when dropped.
pub(crate) struct ReleaseGuard<'a, R: Element>(pub(crate) &'a R);

impl<R: Element> Drop for ReleaseGuard<'_, R> {
    fn drop(&mut self) {
        self.0.release();
    }
}
