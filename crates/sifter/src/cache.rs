//! Persisted cache of built-in parameter metadata.
//!
//! Finding out which built-in parameters exist, and on which categories,
//! means walking a representative record of every category. That walk is
//! slow on a real host, so its result is persisted as a flat JSON list and
//! reloaded on later runs.
//!
//! ```text
//!          ensure()                       clear()
//! Empty ──────────► Loading ──► Populated ───────► Empty
//!                     │
//!                     ├─ read <dir>/<version>/parameter-metadata.json
//!                     └─ on absence or corruption: collect, then persist
//! ```
//!
//! Read, parse and write failures are logged and swallowed. The cache is a
//! best-effort accelerator and never fails a lookup.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sifter_convert::ElementId;
use sifter_params::{metadata, ByteStore, ParameterId, ParameterMetadata};
use tracing::{debug, trace, warn};

use crate::record::Element;
use crate::store::{RecordStore, ScopeGuard};

/// File name of the persisted list inside the version directory.
pub const CACHE_FILE_NAME: &str = "parameter-metadata.json";

/// Lifecycle state of a [`MetadataCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Empty,
    Loading,
    Populated,
}

#[derive(Debug)]
enum State {
    Empty,
    Loading,
    Populated(BTreeMap<ParameterId, ParameterMetadata>),
}

/// Built-in parameter metadata, loaded from a [`ByteStore`] or collected
/// from a [`RecordStore`].
///
/// The cache uses interior mutability without locking and is not `Sync`.
///
/// # Example
///
/// ```
/// use sifter::{MemoryElement, MemoryStore, MetadataCache};
/// use sifter_convert::ElementId;
/// use sifter_filter::StorageKind;
/// use sifter_params::{MemoryByteStore, ParameterId};
///
/// let store = MemoryStore::new().with_element(
///     MemoryElement::instance(ElementId(1), "Wall")
///         .in_category(ElementId(100))
///         .with(ParameterId::builtin_named(-1001, "Mark").unwrap(), StorageKind::String, "W1"),
/// );
///
/// let cache = MetadataCache::new(MemoryByteStore::new(), "cache", "1");
/// let mark = cache.get(&store, &ParameterId::builtin_named(-1001, "Mark").unwrap()).unwrap();
/// assert!(mark.is_instance);
/// assert!(mark.applies_to(ElementId(100)));
/// ```
#[derive(Debug)]
pub struct MetadataCache<B: ByteStore> {
    bytes: B,
    path: PathBuf,
    state: RefCell<State>,
}

impl<B: ByteStore> MetadataCache<B> {
    /// Creates an empty cache persisting to
    /// `<dir>/<version>/parameter-metadata.json`.
    pub fn new(bytes: B, dir: impl AsRef<Path>, version: &str) -> Self {
        Self::at_path(bytes, dir.as_ref().join(version).join(CACHE_FILE_NAME))
    }

    /// Creates an empty cache persisting to `path`.
    pub fn at_path(bytes: B, path: impl Into<PathBuf>) -> Self {
        MetadataCache {
            bytes,
            path: path.into(),
            state: RefCell::new(State::Empty),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn byte_store(&self) -> &B {
        &self.bytes
    }

    pub fn status(&self) -> CacheStatus {
        match &*self.state.borrow() {
            State::Empty => CacheStatus::Empty,
            State::Loading => CacheStatus::Loading,
            State::Populated(_) => CacheStatus::Populated,
        }
    }

    /// Drops the in-memory metadata. The persisted file is kept.
    pub fn clear(&self) {
        debug!(path = %self.path.display(), "metadata cache cleared");
        *self.state.borrow_mut() = State::Empty;
    }

    /// Populates the cache if it is empty.
    ///
    /// A call made while the cache is loading returns without waiting. If
    /// collection cannot start, the cache stays empty and the next call
    /// tries again.
    pub fn ensure<S: RecordStore>(&self, store: &S) {
        if !matches!(*self.state.borrow(), State::Empty) {
            return;
        }
        *self.state.borrow_mut() = State::Loading;
        debug!(path = %self.path.display(), "metadata cache loading");

        let entries = match self.load() {
            Some(entries) => entries,
            None => match collect(store) {
                Some(entries) => {
                    self.persist(&entries);
                    entries
                }
                None => {
                    *self.state.borrow_mut() = State::Empty;
                    return;
                }
            },
        };

        debug!(count = entries.len(), "metadata cache populated");
        *self.state.borrow_mut() = State::Populated(entries);
    }

    /// Metadata for one built-in parameter.
    pub fn get<S: RecordStore>(&self, store: &S, id: &ParameterId) -> Option<ParameterMetadata> {
        self.with_entries(store, |entries| {
            entries
                .get(id)
                .or_else(|| entries.values().find(|m| m.id.same_parameter(id)))
                .cloned()
        })
    }

    /// Every cached entry, ordered by stable form.
    pub fn snapshot<S: RecordStore>(&self, store: &S) -> Vec<ParameterMetadata> {
        self.with_entries(store, |entries| entries.values().cloned().collect())
    }

    /// Every known identifier with display name `name`: built-in
    /// parameters from the cache, then project and shared definitions from
    /// the store.
    pub fn ids_named<S: RecordStore>(&self, store: &S, name: &str) -> Vec<ParameterId> {
        let mut ids: Vec<ParameterId> = self.with_entries(store, |entries| {
            entries
                .values()
                .filter(|m| m.id.display_name() == Some(name))
                .map(|m| m.id.clone())
                .collect()
        });
        for def in store.parameter_definitions() {
            if def.display_name() == Some(name) && !ids.iter().any(|id| id.same_parameter(&def)) {
                ids.push(def);
            }
        }
        ids
    }

    fn with_entries<S, T, F>(&self, store: &S, read: F) -> T
    where
        S: RecordStore,
        F: FnOnce(&BTreeMap<ParameterId, ParameterMetadata>) -> T,
    {
        self.ensure(store);
        match &*self.state.borrow() {
            State::Populated(entries) => read(entries),
            _ => read(&BTreeMap::new()),
        }
    }

    fn load(&self) -> Option<BTreeMap<ParameterId, ParameterMetadata>> {
        if !self.bytes.exists(&self.path) {
            debug!(path = %self.path.display(), "no persisted metadata");
            return None;
        }
        let text = match self.bytes.read_text(&self.path) {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to read metadata cache");
                return None;
            }
        };
        match metadata::from_json(&text) {
            Ok(list) => Some(list.into_iter().map(|m| (m.id.clone(), m)).collect()),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "discarding corrupt metadata cache");
                None
            }
        }
    }

    fn persist(&self, entries: &BTreeMap<ParameterId, ParameterMetadata>) {
        let json = match metadata::to_json(entries.values()) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "failed to serialize metadata cache");
                return;
            }
        };
        if let Some(dir) = self.path.parent() {
            if let Err(err) = self.bytes.ensure_dir(dir) {
                warn!(dir = %dir.display(), error = %err, "failed to create metadata cache directory");
                return;
            }
        }
        if let Err(err) = self.bytes.write_text(&self.path, &json) {
            warn!(path = %self.path.display(), error = %err, "failed to write metadata cache");
        }
    }
}

/// Walks one representative record per category, inside a scope that is
/// always rolled back.
///
/// Returns `None` when the scope cannot be started. Nothing is collected
/// then, and nothing must be persisted.
fn collect<S: RecordStore>(store: &S) -> Option<BTreeMap<ParameterId, ParameterMetadata>> {
    let mut entries = BTreeMap::new();

    let _scope = match ScopeGuard::start(store.open_scope("collect parameter metadata")) {
        Ok(scope) => scope,
        Err(err) => {
            warn!(error = %err, "could not open collection scope");
            return None;
        }
    };

    for category in store.categories() {
        if category.value() < 0 {
            trace!(%category, "skipping category with negative id");
            continue;
        }
        let Some(record) = store.representative(category) else {
            trace!(%category, "no representative record");
            continue;
        };
        trace!(%category, record = %record.id(), "collecting parameters");

        record_parameters(&mut entries, record, category, !record.is_type());
        if let Some(type_record) = record.type_id().and_then(|id| store.get(id)) {
            record_parameters(&mut entries, type_record, category, false);
        }
    }

    Some(entries)
}

fn record_parameters<R: Element>(
    entries: &mut BTreeMap<ParameterId, ParameterMetadata>,
    record: &R,
    category: ElementId,
    on_instance: bool,
) {
    for info in record.parameters() {
        if !info.id.is_builtin() {
            continue;
        }
        let meta = entries
            .entry(info.id.clone())
            .or_insert_with(|| ParameterMetadata::new(info.id, on_instance));
        meta.is_instance |= on_instance;
        meta.add_category(category);
    }
}
