//! Strict structural matching.
//!
//! A [`StrictStructure`] is an allow-list: a value matches when it is a
//! [`Record`] whose keys are exactly the required fields plus any subset of
//! the optional ones, and every present field passes its predicate.  Unknown
//! keys (including symbol keys) always fail the match.

use crate::value::{PropertyKey, Record, Value};

/// Per-field predicate.
pub type Predicate = fn(&Value) -> bool;

/// A named field and the predicate its value must satisfy.
pub type FieldGuard<'a> = (&'a str, Predicate);

// ---------------------------------------------------------------------------
// Primitive predicates
// ---------------------------------------------------------------------------

pub fn is_boolean(value: &Value) -> bool {
    value.is_boolean()
}

pub fn is_function(value: &Value) -> bool {
    value.is_callable()
}

/// Accepts every value, including `undefined`.
pub fn is_anything(_value: &Value) -> bool {
    true
}

/// Union of guards: `true` when any guard accepts the value.
pub fn any_of(value: &Value, guards: &[Predicate]) -> bool {
    guards.iter().any(|guard| guard(value))
}

// ---------------------------------------------------------------------------
// StrictStructure
// ---------------------------------------------------------------------------

/// Allow-list validator over record fields.
#[derive(Debug, Clone, Copy)]
pub struct StrictStructure<'a> {
    required: &'a [FieldGuard<'a>],
    optional: &'a [FieldGuard<'a>],
}

impl<'a> StrictStructure<'a> {
    pub const fn new(required: &'a [FieldGuard<'a>], optional: &'a [FieldGuard<'a>]) -> Self {
        Self { required, optional }
    }

    /// Does `value` match this structure?  Non-records never match.
    pub fn matches(&self, value: &Value) -> bool {
        value
            .as_record()
            .is_some_and(|record| self.matches_record(record))
    }

    pub fn matches_record(&self, record: &Record) -> bool {
        let has_required = self.required.iter().all(|(name, _)| record.has(name));
        has_required
            && record
                .iter()
                .all(|(key, value)| self.guard_for(key).is_some_and(|guard| guard(value)))
    }

    fn guard_for(&self, key: &PropertyKey) -> Option<Predicate> {
        let PropertyKey::String(name) = key else {
            return None;
        };
        self.required
            .iter()
            .chain(self.optional)
            .find(|(field, _)| *field == name.as_str())
            .map(|(_, guard)| *guard)
    }
}

/// One-shot form of [`StrictStructure::matches`].
pub fn is_strict_structure(
    value: &Value,
    required: &[FieldGuard<'_>],
    optional: &[FieldGuard<'_>],
) -> bool {
    StrictStructure::new(required, optional).matches(value)
}
