//! Typed view over validated descriptor records.
//!
//! [`Descriptor`] is the tagged form of a record that passed one of the
//! shape guards in [`crate::guard`].  The variant is chosen from the fields
//! present on the record, never supplied by the caller, so a `Descriptor`
//! always satisfies the value/accessor exclusion.

use serde::{Deserialize, Serialize};

use crate::guard::{
    self, CONFIGURABLE, DescriptorKind, ENUMERABLE, GET, SET, VALUE, WRITABLE,
};
use crate::value::{Function, Record, Value};

// ---------------------------------------------------------------------------
// DescriptorError
// ---------------------------------------------------------------------------

/// Failure to read a value as a typed descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum DescriptorError {
    #[error("expected a descriptor record, found {type_name}")]
    NotARecord { type_name: String },
    #[error("record {{{}}} matches no descriptor shape", .fields.join(", "))]
    NotADescriptor { fields: Vec<String> },
}

impl DescriptorError {
    /// Stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotARecord { .. } => "FE-DESC-GUARD-0001",
            Self::NotADescriptor { .. } => "FE-DESC-GUARD-0002",
        }
    }
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// A validated partial descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor {
    /// Flags only.
    Plain {
        configurable: Option<bool>,
        enumerable: Option<bool>,
    },
    /// Stored value with optional writability.
    Value {
        configurable: Option<bool>,
        enumerable: Option<bool>,
        value: Value,
        writable: Option<bool>,
    },
    /// Getter with optional setter.
    Accessor {
        configurable: Option<bool>,
        enumerable: Option<bool>,
        get: Function,
        set: Option<Function>,
    },
}

impl Descriptor {
    /// `{}`: no flags and no value or accessor.
    pub fn empty() -> Self {
        Self::Plain {
            configurable: None,
            enumerable: None,
        }
    }

    /// `{ value }` with no flags.
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value {
            configurable: None,
            enumerable: None,
            value: value.into(),
            writable: None,
        }
    }

    /// `{ get }` with no flags.
    pub fn getter(get: Function) -> Self {
        Self::Accessor {
            configurable: None,
            enumerable: None,
            get,
            set: None,
        }
    }

    pub fn kind(&self) -> DescriptorKind {
        match self {
            Self::Plain { .. } => DescriptorKind::Plain,
            Self::Value { .. } => DescriptorKind::Value,
            Self::Accessor { .. } => DescriptorKind::Accessor,
        }
    }

    pub fn configurable(&self) -> Option<bool> {
        match self {
            Self::Plain { configurable, .. }
            | Self::Value { configurable, .. }
            | Self::Accessor { configurable, .. } => *configurable,
        }
    }

    pub fn enumerable(&self) -> Option<bool> {
        match self {
            Self::Plain { enumerable, .. }
            | Self::Value { enumerable, .. }
            | Self::Accessor { enumerable, .. } => *enumerable,
        }
    }

    /// Set the `configurable` flag, builder-style.
    pub fn with_configurable(mut self, flag: bool) -> Self {
        match &mut self {
            Self::Plain { configurable, .. }
            | Self::Value { configurable, .. }
            | Self::Accessor { configurable, .. } => *configurable = Some(flag),
        }
        self
    }

    /// Set the `enumerable` flag, builder-style.
    pub fn with_enumerable(mut self, flag: bool) -> Self {
        match &mut self {
            Self::Plain { enumerable, .. }
            | Self::Value { enumerable, .. }
            | Self::Accessor { enumerable, .. } => *enumerable = Some(flag),
        }
        self
    }

    /// Set `writable`; no-op on non-value descriptors.
    pub fn with_writable(mut self, flag: bool) -> Self {
        if let Self::Value { writable, .. } = &mut self {
            *writable = Some(flag);
        }
        self
    }

    /// Set `set`; no-op on non-accessor descriptors.
    pub fn with_setter(mut self, setter: Function) -> Self {
        if let Self::Accessor { set, .. } = &mut self {
            *set = Some(setter);
        }
        self
    }

    /// Lower into a raw record.  Absent optional fields stay absent.
    pub fn into_record(self) -> Record {
        let mut record = Record::new();
        if let Some(flag) = self.configurable() {
            record.insert(CONFIGURABLE, flag);
        }
        if let Some(flag) = self.enumerable() {
            record.insert(ENUMERABLE, flag);
        }
        match self {
            Self::Plain { .. } => {}
            Self::Value {
                value, writable, ..
            } => {
                record.insert(VALUE, value);
                if let Some(flag) = writable {
                    record.insert(WRITABLE, flag);
                }
            }
            Self::Accessor { get, set, .. } => {
                record.insert(GET, get);
                if let Some(set) = set {
                    record.insert(SET, set);
                }
            }
        }
        record
    }
}

fn flag(record: &Record, name: &str) -> Option<bool> {
    record.field(name).and_then(Value::as_bool)
}

fn function(record: &Record, name: &str) -> Option<Function> {
    record.field(name).and_then(Value::as_function).cloned()
}

impl TryFrom<&Record> for Descriptor {
    type Error = DescriptorError;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        let configurable = flag(record, CONFIGURABLE);
        let enumerable = flag(record, ENUMERABLE);
        let shape = Value::Record(record.clone());

        if guard::is_plain_descriptor(&shape) {
            return Ok(Self::Plain {
                configurable,
                enumerable,
            });
        }
        if guard::is_value_descriptor(&shape) {
            return Ok(Self::Value {
                configurable,
                enumerable,
                value: record.field(VALUE).cloned().unwrap_or_default(),
                writable: flag(record, WRITABLE),
            });
        }
        if guard::is_accessor_descriptor(&shape)
            && let Some(get) = function(record, GET)
        {
            return Ok(Self::Accessor {
                configurable,
                enumerable,
                get,
                set: function(record, SET),
            });
        }
        Err(DescriptorError::NotADescriptor {
            fields: record.keys().map(ToString::to_string).collect(),
        })
    }
}

impl TryFrom<&Value> for Descriptor {
    type Error = DescriptorError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Record(record) => Self::try_from(record),
            other => Err(DescriptorError::NotARecord {
                type_name: other.type_name().to_string(),
            }),
        }
    }
}

impl From<Descriptor> for Record {
    fn from(descriptor: Descriptor) -> Self {
        descriptor.into_record()
    }
}

impl From<Descriptor> for Value {
    fn from(descriptor: Descriptor) -> Self {
        Value::Record(descriptor.into_record())
    }
}
