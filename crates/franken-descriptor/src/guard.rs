//! Descriptor shape guards.
//!
//! Three strict shapes, anchored on their required field:
//!
//! | shape    | required | optional                               |
//! |----------|----------|----------------------------------------|
//! | plain    | none     | `configurable`, `enumerable`           |
//! | value    | `value`  | `configurable`, `enumerable`, `writable` |
//! | accessor | `get`    | `configurable`, `enumerable`, `set`    |
//!
//! Because the shapes are strict, a record mixing value and accessor fields
//! fails all three, and no record can satisfy more than one.  A set-only
//! record is rejected: `get` anchors the accessor shape.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::structure::{
    FieldGuard, Predicate, StrictStructure, any_of, is_anything, is_boolean, is_function,
};
use crate::value::Value;

pub const CONFIGURABLE: &str = "configurable";
pub const ENUMERABLE: &str = "enumerable";
pub const VALUE: &str = "value";
pub const WRITABLE: &str = "writable";
pub const GET: &str = "get";
pub const SET: &str = "set";

/// Fields that give a descriptor its value nature.
pub const VALUE_FIELDS: [&str; 2] = [VALUE, WRITABLE];
/// Fields that give a descriptor its accessor nature.
pub const ACCESSOR_FIELDS: [&str; 2] = [GET, SET];

const PLAIN_OPTIONAL: &[FieldGuard<'static>] =
    &[(CONFIGURABLE, is_boolean), (ENUMERABLE, is_boolean)];
const VALUE_REQUIRED: &[FieldGuard<'static>] = &[(VALUE, is_anything)];
const VALUE_OPTIONAL: &[FieldGuard<'static>] = &[
    (CONFIGURABLE, is_boolean),
    (ENUMERABLE, is_boolean),
    (WRITABLE, is_boolean),
];
const ACCESSOR_REQUIRED: &[FieldGuard<'static>] = &[(GET, is_function)];
const ACCESSOR_OPTIONAL: &[FieldGuard<'static>] = &[
    (CONFIGURABLE, is_boolean),
    (ENUMERABLE, is_boolean),
    (SET, is_function),
];

pub const PLAIN_DESCRIPTOR: StrictStructure<'static> = StrictStructure::new(&[], PLAIN_OPTIONAL);
pub const VALUE_DESCRIPTOR: StrictStructure<'static> =
    StrictStructure::new(VALUE_REQUIRED, VALUE_OPTIONAL);
pub const ACCESSOR_DESCRIPTOR: StrictStructure<'static> =
    StrictStructure::new(ACCESSOR_REQUIRED, ACCESSOR_OPTIONAL);

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

/// `{ configurable?: bool, enumerable?: bool }`
pub fn is_plain_descriptor(value: &Value) -> bool {
    PLAIN_DESCRIPTOR.matches(value)
}

/// `{ configurable?: bool, enumerable?: bool, value: any, writable?: bool }`
pub fn is_value_descriptor(value: &Value) -> bool {
    VALUE_DESCRIPTOR.matches(value)
}

/// `{ configurable?: bool, enumerable?: bool, get: fn, set?: fn }`
pub fn is_accessor_descriptor(value: &Value) -> bool {
    ACCESSOR_DESCRIPTOR.matches(value)
}

/// Any of the three descriptor shapes.
pub fn is_descriptor(value: &Value) -> bool {
    any_of(
        value,
        &[
            is_plain_descriptor as Predicate,
            is_value_descriptor,
            is_accessor_descriptor,
        ],
    )
}

// ---------------------------------------------------------------------------
// DescriptorKind
// ---------------------------------------------------------------------------

/// Which descriptor shape a value matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorKind {
    Plain,
    Value,
    Accessor,
}

impl DescriptorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Value => "value",
            Self::Accessor => "accessor",
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `value` into its descriptor shape, if it has one.
pub fn classify(value: &Value) -> Option<DescriptorKind> {
    if is_plain_descriptor(value) {
        Some(DescriptorKind::Plain)
    } else if is_value_descriptor(value) {
        Some(DescriptorKind::Value)
    } else if is_accessor_descriptor(value) {
        Some(DescriptorKind::Accessor)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Function, Record};

    fn desc(record: Record) -> Value {
        Value::Record(record)
    }

    fn getter() -> Value {
        Value::Function(Function::new("getter", |_| Value::Bool(true)))
    }

    fn setter() -> Value {
        Value::Function(Function::new("setter", |_| Value::Undefined))
    }

    fn matches(value: &Value) -> [bool; 3] {
        [
            is_plain_descriptor(value),
            is_value_descriptor(value),
            is_accessor_descriptor(value),
        ]
    }

    // -----------------------------------------------------------------------
    // 1. Plain
    // -----------------------------------------------------------------------

    #[test]
    fn empty_record_is_plain() {
        let value = desc(Record::new());
        assert_eq!(matches(&value), [true, false, false]);
        assert_eq!(classify(&value), Some(DescriptorKind::Plain));
    }

    #[test]
    fn plain_flags_must_be_boolean() {
        assert!(is_plain_descriptor(&desc(
            Record::new().with(CONFIGURABLE, true).with(ENUMERABLE, false)
        )));
        assert!(!is_plain_descriptor(&desc(Record::new().with(CONFIGURABLE, 1))));
        assert!(!is_descriptor(&desc(Record::new().with(ENUMERABLE, 1))));
    }

    // -----------------------------------------------------------------------
    // 2. Value
    // -----------------------------------------------------------------------

    #[test]
    fn value_shape_accepts_any_value() {
        for v in [Value::Undefined, Value::Null, Value::Int(1234), getter()] {
            let value = desc(Record::new().with(VALUE, v));
            assert_eq!(classify(&value), Some(DescriptorKind::Value));
        }
    }

    #[test]
    fn writable_without_value_is_invalid() {
        let value = desc(Record::new().with(WRITABLE, true));
        assert_eq!(matches(&value), [false, false, false]);
        assert!(!is_descriptor(&value));
    }

    // -----------------------------------------------------------------------
    // 3. Accessor
    // -----------------------------------------------------------------------

    #[test]
    fn getter_anchors_accessor_shape() {
        assert!(is_accessor_descriptor(&desc(Record::new().with(GET, getter()))));
        assert!(is_accessor_descriptor(&desc(
            Record::new().with(GET, getter()).with(SET, setter())
        )));
        assert!(!is_accessor_descriptor(&desc(Record::new().with(SET, setter()))));
    }

    #[test]
    fn accessor_fields_must_be_functions() {
        assert!(!is_accessor_descriptor(&desc(Record::new().with(GET, 1))));
        assert!(!is_accessor_descriptor(&desc(
            Record::new().with(GET, getter()).with(SET, Value::Undefined)
        )));
    }

    // -----------------------------------------------------------------------
    // 4. Union and strictness
    // -----------------------------------------------------------------------

    #[test]
    fn mixed_natures_match_nothing() {
        let value = desc(
            Record::new()
                .with(CONFIGURABLE, true)
                .with(GET, getter())
                .with(SET, setter())
                .with(VALUE, 1234)
                .with(WRITABLE, true),
        );
        assert_eq!(matches(&value), [false, false, false]);
        assert_eq!(classify(&value), None);
    }

    #[test]
    fn unknown_field_breaks_every_shape() {
        for base in [
            Record::new().with(ENUMERABLE, true),
            Record::new().with(VALUE, 1),
            Record::new().with(GET, getter()),
        ] {
            assert!(is_descriptor(&desc(base.clone())));
            let value = desc(base.with("extra", true));
            assert_eq!(matches(&value), [false, false, false]);
        }
    }

    #[test]
    fn non_records_are_not_descriptors() {
        assert!(!is_descriptor(&Value::Undefined));
        assert!(!is_descriptor(&Value::Null));
        assert!(!is_descriptor(&getter()));
    }

    #[test]
    fn kind_display() {
        assert_eq!(DescriptorKind::Accessor.to_string(), "accessor");
        assert_eq!(DescriptorKind::Plain.as_str(), "plain");
    }
}
