//! Host object model: ordinary objects, complete property descriptors, and
//! the integrity levels (extensible / sealed / frozen) the resolver mirrors.
//!
//! - **Property descriptors**: complete data vs accessor descriptors
//! - **Definition**: partial [`Descriptor`]s completed with ES defaults
//! - **Assignment**: `[[Set]]` on own properties, extension on new keys
//! - **Integrity**: freeze, seal, preventExtensions and their predicates
//! - **Prototype chains**: value lookup walks `[[Prototype]]`
//!
//! `BTreeMap`/`BTreeSet` for deterministic ordering.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::descriptor::Descriptor;
use crate::guard::{CONFIGURABLE, ENUMERABLE, GET, SET, VALUE, WRITABLE};
use crate::value::{Function, ObjectHandle, PropertyKey, Record, SymbolId, Value};

/// Maximum prototype chain depth to prevent infinite loops.
const MAX_PROTOTYPE_CHAIN_DEPTH: u32 = 1024;

// ---------------------------------------------------------------------------
// PropertyDescriptor
// ---------------------------------------------------------------------------

/// Complete property descriptor as stored on an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyDescriptor {
    /// Data descriptor: has `value` and `writable`.
    Data {
        value: Value,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    },
    /// Accessor descriptor: has `get` and/or `set`.
    Accessor {
        get: Option<Function>,
        set: Option<Function>,
        enumerable: bool,
        configurable: bool,
    },
}

impl PropertyDescriptor {
    /// Default data descriptor, as produced by plain assignment
    /// (writable, enumerable, configurable).
    pub fn data(value: impl Into<Value>) -> Self {
        Self::Data {
            value: value.into(),
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Complete a partial descriptor against the current one, if any.
    ///
    /// Fields the partial descriptor leaves out keep their current value, or
    /// default to `false`/`undefined` for a new property.  Switching between
    /// data and accessor keeps only `configurable` and `enumerable`.
    pub fn complete(partial: Descriptor, current: Option<&Self>) -> Self {
        let configurable = partial
            .configurable()
            .unwrap_or_else(|| current.is_some_and(Self::is_configurable));
        let enumerable = partial
            .enumerable()
            .unwrap_or_else(|| current.is_some_and(Self::is_enumerable));

        match partial {
            Descriptor::Plain { .. } => match current {
                Some(Self::Data {
                    value, writable, ..
                }) => Self::Data {
                    value: value.clone(),
                    writable: *writable,
                    enumerable,
                    configurable,
                },
                Some(Self::Accessor { get, set, .. }) => Self::Accessor {
                    get: get.clone(),
                    set: set.clone(),
                    enumerable,
                    configurable,
                },
                None => Self::Data {
                    value: Value::Undefined,
                    writable: false,
                    enumerable,
                    configurable,
                },
            },
            Descriptor::Value {
                value, writable, ..
            } => {
                let current_writable = matches!(
                    current,
                    Some(Self::Data { writable: true, .. })
                );
                Self::Data {
                    value,
                    writable: writable.unwrap_or(current_writable),
                    enumerable,
                    configurable,
                }
            }
            Descriptor::Accessor { get, set, .. } => {
                let current_set = match current {
                    Some(Self::Accessor { set, .. }) => set.clone(),
                    _ => None,
                };
                Self::Accessor {
                    get: Some(get),
                    set: set.or(current_set),
                    enumerable,
                    configurable,
                }
            }
        }
    }

    pub fn is_configurable(&self) -> bool {
        match self {
            Self::Data { configurable, .. } | Self::Accessor { configurable, .. } => *configurable,
        }
    }

    pub fn is_enumerable(&self) -> bool {
        match self {
            Self::Data { enumerable, .. } | Self::Accessor { enumerable, .. } => *enumerable,
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data { .. })
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self, Self::Accessor { .. })
    }

    /// Get the value if this is a data descriptor.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Data { value, .. } => Some(value),
            Self::Accessor { .. } => None,
        }
    }

    /// Is this a data descriptor with writable=true?
    pub fn is_writable(&self) -> bool {
        match self {
            Self::Data { writable, .. } => *writable,
            Self::Accessor { .. } => false,
        }
    }

    pub fn set_non_configurable(&mut self) {
        match self {
            Self::Data { configurable, .. } | Self::Accessor { configurable, .. } => {
                *configurable = false;
            }
        }
    }

    /// Make this data descriptor non-writable (no-op for accessors).
    pub fn set_non_writable(&mut self) {
        if let Self::Data { writable, .. } = self {
            *writable = false;
        }
    }

    /// Express this descriptor as a raw record, the way
    /// `Object.getOwnPropertyDescriptor` reports it.  Missing accessor halves
    /// are left out rather than reported as `undefined`.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        match self {
            Self::Data {
                value, writable, ..
            } => {
                record.insert(VALUE, value.clone());
                record.insert(WRITABLE, *writable);
            }
            Self::Accessor { get, set, .. } => {
                if let Some(get) = get {
                    record.insert(GET, get.clone());
                }
                if let Some(set) = set {
                    record.insert(SET, set.clone());
                }
            }
        }
        record.insert(ENUMERABLE, self.is_enumerable());
        record.insert(CONFIGURABLE, self.is_configurable());
        record
    }
}

// ---------------------------------------------------------------------------
// ObjectError
// ---------------------------------------------------------------------------

/// Errors from object model operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ObjectError {
    #[error("TypeError: {0}")]
    TypeError(String),
    #[error("{0} not found")]
    ObjectNotFound(ObjectHandle),
    #[error("TypeError: prototype chain cycle detected")]
    PrototypeCycleDetected,
    #[error("TypeError: prototype chain depth {depth} exceeds max {max}")]
    PrototypeChainTooDeep { depth: u32, max: u32 },
}

impl ObjectError {
    /// Stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TypeError(_) => "FE-DESC-HOST-0001",
            Self::ObjectNotFound(_) => "FE-DESC-HOST-0002",
            Self::PrototypeCycleDetected => "FE-DESC-HOST-0003",
            Self::PrototypeChainTooDeep { .. } => "FE-DESC-HOST-0004",
        }
    }
}

// ---------------------------------------------------------------------------
// OrdinaryObject
// ---------------------------------------------------------------------------

/// An ordinary object with internal slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdinaryObject {
    /// `[[Prototype]]` internal slot (None means end of chain).
    pub prototype: Option<ObjectHandle>,
    /// `[[Extensible]]` internal slot.
    pub extensible: bool,
    /// Own properties with descriptors, keyed by PropertyKey.
    pub properties: BTreeMap<PropertyKey, PropertyDescriptor>,
}

impl Default for OrdinaryObject {
    fn default() -> Self {
        Self {
            prototype: None,
            extensible: true,
            properties: BTreeMap::new(),
        }
    }
}

impl OrdinaryObject {
    pub fn with_prototype(proto: Option<ObjectHandle>) -> Self {
        Self {
            prototype: proto,
            ..Self::default()
        }
    }

    // -- [[GetOwnProperty]] -------------------------------------------------

    pub fn get_own_property(&self, key: &PropertyKey) -> Option<&PropertyDescriptor> {
        self.properties.get(key)
    }

    pub fn has_own_property(&self, key: &PropertyKey) -> bool {
        self.properties.contains_key(key)
    }

    // -- [[DefineOwnProperty]] ----------------------------------------------

    /// Define or update a property from a complete descriptor.
    ///
    /// Returns `Ok(true)` if the property was defined, `Ok(false)` if rejected
    /// (non-extensible object, or a change a non-configurable property
    /// forbids).
    pub fn define_own_property(
        &mut self,
        key: PropertyKey,
        desc: PropertyDescriptor,
    ) -> Result<bool, ObjectError> {
        let Some(current) = self.properties.get(&key) else {
            if !self.extensible {
                return Ok(false);
            }
            self.properties.insert(key, desc);
            return Ok(true);
        };

        if !current.is_configurable() {
            if desc.is_configurable() || desc.is_enumerable() != current.is_enumerable() {
                return Ok(false);
            }
            if current.is_data() != desc.is_data() {
                return Ok(false);
            }
            if let (
                PropertyDescriptor::Data {
                    writable: false,
                    value: current_value,
                    ..
                },
                PropertyDescriptor::Data {
                    writable: new_writable,
                    value: new_value,
                    ..
                },
            ) = (current, &desc)
                && (*new_writable || current_value != new_value)
            {
                return Ok(false);
            }
            if let (
                PropertyDescriptor::Accessor {
                    get: cur_get,
                    set: cur_set,
                    ..
                },
                PropertyDescriptor::Accessor {
                    get: new_get,
                    set: new_set,
                    ..
                },
            ) = (current, &desc)
                && (cur_get != new_get || cur_set != new_set)
            {
                return Ok(false);
            }
        }
        self.properties.insert(key, desc);
        Ok(true)
    }

    /// `Object.defineProperty` with a partial descriptor.
    pub fn define_property(
        &mut self,
        key: PropertyKey,
        partial: Descriptor,
    ) -> Result<bool, ObjectError> {
        let complete = PropertyDescriptor::complete(partial, self.properties.get(&key));
        self.define_own_property(key, complete)
    }

    // -- [[Set]] --------------------------------------------------------------

    /// Assignment to an own property (`obj[key] = value`).
    ///
    /// Writable data properties are overwritten, accessors dispatch to their
    /// setter, and unknown keys are added as default data properties when
    /// the object is extensible.
    pub fn set(&mut self, key: PropertyKey, value: Value) -> bool {
        match self.properties.get_mut(&key) {
            Some(PropertyDescriptor::Data {
                value: slot,
                writable: true,
                ..
            }) => {
                *slot = value;
                true
            }
            Some(PropertyDescriptor::Data { .. }) => false,
            Some(PropertyDescriptor::Accessor { set, .. }) => match set {
                Some(setter) => {
                    setter.call(&[value]);
                    true
                }
                None => false,
            },
            None if self.extensible => {
                self.properties.insert(key, PropertyDescriptor::data(value));
                true
            }
            None => false,
        }
    }

    // -- [[Delete]] -----------------------------------------------------------

    /// Returns `false` if the property is non-configurable.
    pub fn delete(&mut self, key: &PropertyKey) -> bool {
        match self.properties.get(key) {
            Some(desc) if !desc.is_configurable() => false,
            Some(_) => {
                self.properties.remove(key);
                true
            }
            None => true,
        }
    }

    // -- Integrity levels -----------------------------------------------------

    /// `[[PreventExtensions]]()`: makes this object non-extensible.
    pub fn prevent_extensions(&mut self) {
        self.extensible = false;
    }

    /// `Object.freeze` semantics: make all own properties non-configurable
    /// and data properties non-writable.
    pub fn freeze(&mut self) {
        self.extensible = false;
        for desc in self.properties.values_mut() {
            desc.set_non_configurable();
            desc.set_non_writable();
        }
    }

    /// `Object.seal` semantics: make all own properties non-configurable
    /// but leave writable unchanged.
    pub fn seal(&mut self) {
        self.extensible = false;
        for desc in self.properties.values_mut() {
            desc.set_non_configurable();
        }
    }

    pub fn is_extensible(&self) -> bool {
        self.extensible
    }

    /// Non-extensible, every own property non-configurable, every data
    /// property non-writable.  An empty non-extensible object is frozen.
    pub fn is_frozen(&self) -> bool {
        self.is_sealed() && self.properties.values().all(|d| !d.is_writable())
    }

    /// Non-extensible and every own property non-configurable.
    pub fn is_sealed(&self) -> bool {
        !self.extensible && self.properties.values().all(|d| !d.is_configurable())
    }
}

// ---------------------------------------------------------------------------
// ObjectHeap: the managed object store
// ---------------------------------------------------------------------------

/// Arena of ordinary objects addressed by [`ObjectHandle`].
#[derive(Debug, Clone, Default)]
pub struct ObjectHeap {
    objects: Vec<OrdinaryObject>,
    next_symbol: u32,
}

impl ObjectHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new ordinary object with the given prototype.
    pub fn alloc(&mut self, proto: Option<ObjectHandle>) -> ObjectHandle {
        let handle = ObjectHandle(self.objects.len() as u32);
        self.objects.push(OrdinaryObject::with_prototype(proto));
        handle
    }

    pub fn alloc_plain(&mut self) -> ObjectHandle {
        self.alloc(None)
    }

    /// Allocate a new unique symbol id.
    pub fn alloc_symbol(&mut self) -> SymbolId {
        self.next_symbol += 1;
        SymbolId(self.next_symbol)
    }

    pub fn get(&self, handle: ObjectHandle) -> Result<&OrdinaryObject, ObjectError> {
        self.objects
            .get(handle.0 as usize)
            .ok_or(ObjectError::ObjectNotFound(handle))
    }

    pub fn get_mut(&mut self, handle: ObjectHandle) -> Result<&mut OrdinaryObject, ObjectError> {
        self.objects
            .get_mut(handle.0 as usize)
            .ok_or(ObjectError::ObjectNotFound(handle))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    // -- High-level operations requiring heap access ------------------------

    /// `[[Get]](O, P)`: read a property, walking the prototype chain.
    /// Accessors are invoked with no arguments.
    pub fn get_property(&self, handle: ObjectHandle, key: &PropertyKey) -> Result<Value, ObjectError> {
        let mut current = Some(handle);
        let mut depth: u32 = 0;
        let mut visited = BTreeSet::new();

        while let Some(h) = current {
            if depth > MAX_PROTOTYPE_CHAIN_DEPTH {
                return Err(ObjectError::PrototypeChainTooDeep {
                    depth,
                    max: MAX_PROTOTYPE_CHAIN_DEPTH,
                });
            }
            if !visited.insert(h) {
                return Err(ObjectError::PrototypeCycleDetected);
            }

            let obj = self.get(h)?;
            if let Some(desc) = obj.get_own_property(key) {
                return Ok(match desc {
                    PropertyDescriptor::Data { value, .. } => value.clone(),
                    PropertyDescriptor::Accessor { get: Some(getter), .. } => getter.call(&[]),
                    PropertyDescriptor::Accessor { get: None, .. } => Value::Undefined,
                });
            }
            current = obj.prototype;
            depth += 1;
        }

        Ok(Value::Undefined)
    }

    /// `obj[key] = value` on an own property.
    pub fn set_property(
        &mut self,
        handle: ObjectHandle,
        key: impl Into<PropertyKey>,
        value: impl Into<Value>,
    ) -> Result<bool, ObjectError> {
        Ok(self.get_mut(handle)?.set(key.into(), value.into()))
    }

    /// `Object.defineProperty(O, P, Desc)`.
    pub fn define_property(
        &mut self,
        handle: ObjectHandle,
        key: impl Into<PropertyKey>,
        desc: Descriptor,
    ) -> Result<bool, ObjectError> {
        self.get_mut(handle)?.define_property(key.into(), desc)
    }

    pub fn delete_property(&mut self, handle: ObjectHandle, key: &PropertyKey) -> Result<bool, ObjectError> {
        Ok(self.get_mut(handle)?.delete(key))
    }

    /// `Object.getOwnPropertyDescriptor(O, P)`.
    pub fn get_own_property_descriptor(
        &self,
        handle: ObjectHandle,
        key: &PropertyKey,
    ) -> Result<Option<PropertyDescriptor>, ObjectError> {
        Ok(self.get(handle)?.get_own_property(key).cloned())
    }

    pub fn has_own(&self, handle: ObjectHandle, key: &PropertyKey) -> Result<bool, ObjectError> {
        Ok(self.get(handle)?.has_own_property(key))
    }

    /// `Object.isExtensible(O)`.
    pub fn is_extensible(&self, handle: ObjectHandle) -> Result<bool, ObjectError> {
        Ok(self.get(handle)?.is_extensible())
    }

    /// `Object.isFrozen(O)`.
    pub fn is_frozen(&self, handle: ObjectHandle) -> Result<bool, ObjectError> {
        Ok(self.get(handle)?.is_frozen())
    }

    /// `Object.isSealed(O)`.
    pub fn is_sealed(&self, handle: ObjectHandle) -> Result<bool, ObjectError> {
        Ok(self.get(handle)?.is_sealed())
    }

    /// `Object.preventExtensions(O)`.
    pub fn prevent_extensions(&mut self, handle: ObjectHandle) -> Result<(), ObjectError> {
        self.get_mut(handle)?.prevent_extensions();
        Ok(())
    }

    /// `Object.freeze(O)`.
    pub fn freeze(&mut self, handle: ObjectHandle) -> Result<(), ObjectError> {
        self.get_mut(handle)?.freeze();
        Ok(())
    }

    /// `Object.seal(O)`.
    pub fn seal(&mut self, handle: ObjectHandle) -> Result<(), ObjectError> {
        self.get_mut(handle)?.seal();
        Ok(())
    }
}
