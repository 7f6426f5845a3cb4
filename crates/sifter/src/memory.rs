//! In-memory record store.
//!
//! [`MemoryStore`] is a complete [`RecordStore`] over owned
//! [`MemoryElement`]s. It backs the tests and serves as the reference for
//! host integrations: attribute writes convert through the registry and are
//! checked for read-only attributes and ownership, scopes are recorded as
//! [`ScopeEvent`]s, and releases are counted per element.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use sifter_convert::{ConvertContext, ConverterRegistry, ElementId, Target, Value};
use sifter_filter::{AttrValue, Attributed, StorageKind};
use sifter_params::ParameterId;
use tracing::debug;

use crate::error::{AttributeError, Result};
use crate::record::{AttributeInfo, Element};
use crate::store::{MutationScope, RecordSeq, RecordStore};

/// One attribute on a [`MemoryElement`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryAttribute {
    pub id: ParameterId,
    pub storage: StorageKind,
    pub value: Value,
    pub read_only: bool,
}

/// A record held by a [`MemoryStore`].
///
/// # Example
///
/// ```
/// use sifter::{Element, MemoryElement};
/// use sifter_convert::ElementId;
/// use sifter_filter::StorageKind;
///
/// let door = MemoryElement::instance(ElementId(10), "Door")
///     .in_category(ElementId(23))
///     .with_type(ElementId(9))
///     .with(-1001, StorageKind::String, "D-101");
///
/// assert_eq!(door.category(), Some(ElementId(23)));
/// assert!(!door.is_type());
/// ```
#[derive(Debug, Clone)]
pub struct MemoryElement {
    id: ElementId,
    type_id: Option<ElementId>,
    category: Option<ElementId>,
    kind: String,
    is_type: bool,
    owner: Option<String>,
    attributes: Vec<MemoryAttribute>,
    releases: Cell<usize>,
}

impl MemoryElement {
    /// Creates an instance record.
    pub fn instance(id: ElementId, kind: impl Into<String>) -> Self {
        MemoryElement {
            id,
            type_id: None,
            category: None,
            kind: kind.into(),
            is_type: false,
            owner: None,
            attributes: Vec::new(),
            releases: Cell::new(0),
        }
    }

    /// Creates a type record.
    pub fn type_record(id: ElementId, kind: impl Into<String>) -> Self {
        MemoryElement {
            is_type: true,
            ..Self::instance(id, kind)
        }
    }

    pub fn in_category(mut self, category: ElementId) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_type(mut self, type_id: ElementId) -> Self {
        self.type_id = Some(type_id);
        self
    }

    pub fn owned_by(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Adds a writable attribute.
    pub fn with(
        self,
        id: impl Into<ParameterId>,
        storage: StorageKind,
        value: impl Into<Value>,
    ) -> Self {
        self.with_attribute(id.into(), storage, value.into(), false)
    }

    /// Adds a read-only attribute.
    pub fn with_read_only(
        self,
        id: impl Into<ParameterId>,
        storage: StorageKind,
        value: impl Into<Value>,
    ) -> Self {
        self.with_attribute(id.into(), storage, value.into(), true)
    }

    fn with_attribute(
        mut self,
        id: ParameterId,
        storage: StorageKind,
        value: Value,
        read_only: bool,
    ) -> Self {
        self.attributes.push(MemoryAttribute {
            id,
            storage,
            value,
            read_only,
        });
        self
    }

    pub fn attributes(&self) -> &[MemoryAttribute] {
        &self.attributes
    }

    /// The stored value of an attribute.
    pub fn value(&self, id: &ParameterId) -> Option<&Value> {
        self.find(id).map(|a| &a.value)
    }

    /// How many times [`Element::release`] was called.
    pub fn release_count(&self) -> usize {
        self.releases.get()
    }

    fn find(&self, id: &ParameterId) -> Option<&MemoryAttribute> {
        self.attributes.iter().find(|a| a.id.same_parameter(id))
    }

    fn find_mut(&mut self, id: &ParameterId) -> Option<&mut MemoryAttribute> {
        self.attributes.iter_mut().find(|a| a.id.same_parameter(id))
    }
}

impl Attributed for MemoryElement {
    fn attribute(&self, id: &ParameterId) -> AttrValue<'_> {
        self.find(id)
            .map(|a| AttrValue::from_value(&a.value))
            .unwrap_or(AttrValue::None)
    }
}

impl Element for MemoryElement {
    fn id(&self) -> ElementId {
        self.id
    }

    fn type_id(&self) -> Option<ElementId> {
        self.type_id
    }

    fn category(&self) -> Option<ElementId> {
        self.category
    }

    fn kind(&self) -> &str {
        &self.kind
    }

    fn is_type(&self) -> bool {
        self.is_type
    }

    fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    fn parameters(&self) -> Vec<AttributeInfo> {
        self.attributes
            .iter()
            .map(|a| AttributeInfo {
                id: a.id.clone(),
                storage: a.storage,
                read_only: a.read_only,
            })
            .collect()
    }

    fn release(&self) {
        self.releases.set(self.releases.get() + 1);
    }
}

/// What happened to a scope opened on a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeEvent {
    Started(String),
    Committed(String),
    RolledBack(String),
}

/// Scope that appends its transitions to the store's event log.
#[derive(Debug)]
pub struct RecordingScope<'a> {
    label: String,
    log: &'a RefCell<Vec<ScopeEvent>>,
}

impl MutationScope for RecordingScope<'_> {
    fn label(&self) -> &str {
        &self.label
    }

    fn start(&mut self) -> Result<()> {
        self.log
            .borrow_mut()
            .push(ScopeEvent::Started(self.label.clone()));
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.log
            .borrow_mut()
            .push(ScopeEvent::Committed(self.label.clone()));
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.log
            .borrow_mut()
            .push(ScopeEvent::RolledBack(self.label.clone()));
        Ok(())
    }
}

/// In-memory [`RecordStore`].
#[derive(Debug)]
pub struct MemoryStore {
    elements: BTreeMap<ElementId, MemoryElement>,
    definitions: Vec<ParameterId>,
    registry: Arc<ConverterRegistry>,
    ctx: ConvertContext,
    user: Option<String>,
    scope_log: RefCell<Vec<ScopeEvent>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

impl MemoryStore {
    /// Creates an empty store converting writes with the built-in registry.
    pub fn new() -> Self {
        MemoryStore {
            elements: BTreeMap::new(),
            definitions: Vec::new(),
            registry: Arc::new(ConverterRegistry::with_builtins()),
            ctx: ConvertContext::default(),
            user: None,
            scope_log: RefCell::new(Vec::new()),
        }
    }

    /// Uses `registry` and `ctx` for attribute writes.
    pub fn with_converter(mut self, registry: Arc<ConverterRegistry>, ctx: ConvertContext) -> Self {
        self.registry = registry;
        self.ctx = ctx;
        self
    }

    /// Adds a record, replacing any record with the same id.
    pub fn with_element(mut self, element: MemoryElement) -> Self {
        self.insert(element);
        self
    }

    /// Declares a project or shared parameter.
    pub fn with_definition(mut self, id: ParameterId) -> Self {
        self.definitions.push(id);
        self
    }

    /// Sets the user attribute writes are made as.
    pub fn as_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Adds a record. Returns the record it replaced, if any.
    pub fn insert(&mut self, element: MemoryElement) -> Option<MemoryElement> {
        self.elements.insert(element.id, element)
    }

    pub fn remove(&mut self, id: ElementId) -> Option<MemoryElement> {
        self.elements.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Scope transitions so far, oldest first.
    pub fn scope_events(&self) -> Vec<ScopeEvent> {
        self.scope_log.borrow().clone()
    }

    /// Writes an attribute, converting `value` to its storage kind.
    ///
    /// `Null` clears the attribute.
    pub fn set_attribute(
        &mut self,
        element: ElementId,
        param: &ParameterId,
        value: impl Into<Value>,
    ) -> std::result::Result<(), AttributeError> {
        let value = value.into();
        let user = self.user.clone();
        let registry = Arc::clone(&self.registry);
        let ctx = self.ctx;

        let record = self
            .elements
            .get_mut(&element)
            .ok_or(AttributeError::ElementNotFound(element))?;

        if let (Some(owner), Some(user)) = (record.owner.as_deref(), user.as_deref()) {
            if owner != user {
                return Err(AttributeError::NotEditable {
                    element,
                    owner: owner.to_string(),
                    user: user.to_string(),
                });
            }
        }

        let attr = record
            .find_mut(param)
            .ok_or_else(|| AttributeError::NotFound {
                element,
                param: param.to_string(),
            })?;
        if attr.read_only {
            return Err(AttributeError::ReadOnly {
                element,
                param: param.to_string(),
            });
        }
        let Some(kind) = attr.storage.value_kind() else {
            return Err(AttributeError::NoStorage {
                element,
                param: param.to_string(),
            });
        };

        let converted = registry
            .try_convert(&value, Target::optional(kind), &ctx)
            .map_err(|source| AttributeError::Conversion {
                param: param.to_string(),
                source,
            })?;
        debug!(%element, %param, "attribute written");
        attr.value = converted;
        Ok(())
    }

    /// Like [`set_attribute`](Self::set_attribute), reporting failure as a
    /// reason string.
    pub fn try_set_attribute(
        &mut self,
        element: ElementId,
        param: &ParameterId,
        value: impl Into<Value>,
    ) -> std::result::Result<(), String> {
        self.set_attribute(element, param, value)
            .map_err(|err| err.to_string())
    }
}

impl RecordStore for MemoryStore {
    type Record = MemoryElement;

    fn records(&self) -> RecordSeq<'_, MemoryElement> {
        RecordSeq::new(self.elements.values())
    }

    fn get(&self, id: ElementId) -> Option<&MemoryElement> {
        self.elements.get(&id)
    }

    fn categories(&self) -> Vec<ElementId> {
        self.elements
            .values()
            .filter_map(|e| e.category)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// The first instance in `category`, else its first type record.
    fn representative(&self, category: ElementId) -> Option<&MemoryElement> {
        let mut in_category = self
            .elements
            .values()
            .filter(|e| e.category == Some(category));
        let first = in_category.next()?;
        if !first.is_type {
            return Some(first);
        }
        in_category.find(|e| !e.is_type).or(Some(first))
    }

    fn parameter_definitions(&self) -> Vec<ParameterId> {
        self.definitions.clone()
    }

    fn open_scope(&self, label: &str) -> Box<dyn MutationScope + '_> {
        Box::new(RecordingScope {
            label: label.to_string(),
            log: &self.scope_log,
        })
    }
}
