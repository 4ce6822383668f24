//! Sequential merge scenarios: one accumulated descriptor is fed a series of
//! partial descriptors and checked after every step.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use frankenengine_descriptor::guard::{CONFIGURABLE, ENUMERABLE, GET, SET, VALUE, WRITABLE};
use frankenengine_descriptor::{Function, Record, Value, is_descriptor, merge, merge_all};

fn accessors() -> (Function, Function, Arc<AtomicI64>) {
    let change = Arc::new(AtomicI64::new(0));
    let read = Arc::clone(&change);
    let getter = Function::new("getter", move |_| Value::Int(read.load(Ordering::SeqCst)));
    let write = Arc::clone(&change);
    let setter = Function::new("setter", move |args| {
        if let Some(Value::Int(n)) = args.first() {
            write.store(*n, Ordering::SeqCst);
        }
        Value::Undefined
    });
    (getter, setter, change)
}

fn step(merged: Record, input: &Record) -> Record {
    merge_all([&merged, input]).expect("two present records always merge")
}

// ===========================================================================
// Step table
// ===========================================================================

#[test]
fn merge_sequence_tracks_descriptor_nature() {
    let (getter, setter, _) = accessors();

    let steps: Vec<(Record, Record)> = vec![
        (
            Record::new().with(ENUMERABLE, true),
            Record::new().with(ENUMERABLE, true),
        ),
        (
            Record::new().with(VALUE, "value"),
            Record::new().with(ENUMERABLE, true).with(VALUE, "value"),
        ),
        (
            Record::new().with(WRITABLE, false),
            Record::new()
                .with(ENUMERABLE, true)
                .with(VALUE, "value")
                .with(WRITABLE, false),
        ),
        (
            Record::new().with(ENUMERABLE, false).with(CONFIGURABLE, false),
            Record::new()
                .with(ENUMERABLE, false)
                .with(VALUE, "value")
                .with(WRITABLE, false)
                .with(CONFIGURABLE, false),
        ),
        (
            Record::new().with(CONFIGURABLE, true),
            Record::new()
                .with(ENUMERABLE, false)
                .with(VALUE, "value")
                .with(WRITABLE, false)
                .with(CONFIGURABLE, true),
        ),
        (
            Record::new().with(VALUE, "change"),
            Record::new()
                .with(ENUMERABLE, false)
                .with(VALUE, "change")
                .with(WRITABLE, false)
                .with(CONFIGURABLE, true),
        ),
        (
            Record::new().with(GET, getter.clone()),
            Record::new()
                .with(ENUMERABLE, false)
                .with(CONFIGURABLE, true)
                .with(GET, getter.clone()),
        ),
        (
            Record::new().with(SET, setter.clone()),
            Record::new()
                .with(ENUMERABLE, false)
                .with(CONFIGURABLE, true)
                .with(GET, getter.clone())
                .with(SET, setter.clone()),
        ),
        (
            Record::new().with(WRITABLE, false),
            Record::new()
                .with(ENUMERABLE, false)
                .with(CONFIGURABLE, true)
                .with(WRITABLE, false)
                .with(VALUE, Value::Undefined),
        ),
        (
            Record::new()
                .with(GET, getter.clone())
                .with(SET, setter.clone()),
            Record::new()
                .with(ENUMERABLE, false)
                .with(CONFIGURABLE, true)
                .with(GET, getter.clone())
                .with(SET, setter.clone()),
        ),
        (
            Record::new().with(ENUMERABLE, true),
            Record::new()
                .with(ENUMERABLE, true)
                .with(CONFIGURABLE, true)
                .with(GET, getter.clone())
                .with(SET, setter.clone()),
        ),
        (
            Record::new().with(VALUE, "modify"),
            Record::new()
                .with(ENUMERABLE, true)
                .with(CONFIGURABLE, true)
                .with(VALUE, "modify"),
        ),
    ];

    let mut merged = Record::new();
    for (i, (input, expected)) in steps.iter().enumerate() {
        merged = step(merged, input);
        assert_eq!(merged, *expected, "step {i}: adding {input}");
        assert!(
            is_descriptor(&Value::Record(merged.clone())),
            "step {i}: {merged} is not a descriptor"
        );
    }

    // A lone setter on a data descriptor becomes an accessor with a
    // synthesized getter.
    merged = step(merged, &Record::new().with(SET, setter.clone()));
    assert!(!merged.has(VALUE));
    assert!(!merged.has(WRITABLE));
    assert_eq!(merged.field(ENUMERABLE), Some(&Value::Bool(true)));
    assert_eq!(merged.field(CONFIGURABLE), Some(&Value::Bool(true)));
    assert_eq!(merged.field(SET), Some(&Value::Function(setter)));

    let synthesized = merged
        .field(GET)
        .and_then(Value::as_function)
        .expect("getter synthesized");
    assert!(!synthesized.same_function(&getter));
    assert_eq!(synthesized.call(&[]), Value::Undefined);
}

#[test]
fn merged_accessors_keep_their_behavior() {
    let (getter, setter, change) = accessors();
    let merged = merge_all([
        &Record::new().with(VALUE, 1),
        &Record::new().with(GET, getter),
        &Record::new().with(SET, setter),
    ])
    .expect("merged");

    let set = merged.field(SET).and_then(Value::as_function).expect("set");
    set.call(&[Value::Int(42)]);
    assert_eq!(change.load(Ordering::SeqCst), 42);

    let get = merged.field(GET).and_then(Value::as_function).expect("get");
    assert_eq!(get.call(&[]), Value::Int(42));
}

// ===========================================================================
// Absent operands
// ===========================================================================

#[test]
fn absent_entries_do_not_break_the_fold() {
    let a = Record::new().with(VALUE, 1);
    let b = Record::new().with(WRITABLE, true);

    let with_gaps = merge([None, Some(a.clone()), None, Some(b.clone()), None]);
    assert_eq!(with_gaps, merge_all([&a, &b]));
    assert_eq!(
        with_gaps,
        Some(Record::new().with(VALUE, 1).with(WRITABLE, true))
    );
}

#[test]
fn all_absent_yields_nothing() {
    assert_eq!(merge([None, None]), None);
    assert_eq!(merge(Vec::<Option<Record>>::new()), None);
}

#[test]
fn merge_does_not_touch_its_inputs() {
    let (getter, _, _) = accessors();
    let data = Record::new().with(VALUE, 1).with(WRITABLE, true);
    let accessor = Record::new().with(GET, getter);

    let merged = merge_all([&data, &accessor]).expect("merged");

    assert!(merged.has(GET));
    assert!(!merged.has(VALUE));
    assert_eq!(data, Record::new().with(VALUE, 1).with(WRITABLE, true));
    assert!(accessor.has(GET));
}
