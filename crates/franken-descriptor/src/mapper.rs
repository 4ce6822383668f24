//! Descriptor projection and merging.
//!
//! `merge` folds a sequence of partial descriptor records left to right.
//! Each step lets the incoming record decide the descriptor's nature: an
//! incoming `get`/`set` purges `value`/`writable` from what was accumulated,
//! an incoming `value`/`writable` purges `get`/`set`.  Incoming fields then
//! overwrite accumulated ones, and the result is repaired so that `set`
//! never appears without `get` and `writable` never without `value`.

use crate::guard::{ACCESSOR_FIELDS, GET, SET, VALUE, VALUE_FIELDS, WRITABLE};
use crate::value::{Function, PropertyKey, Record, Value};

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Keep only the listed fields that are present and not `undefined`.
///
/// Output order follows `record`, not `keys`.
pub fn only<K, I>(record: &Record, keys: I) -> Record
where
    K: Into<PropertyKey>,
    I: IntoIterator<Item = K>,
{
    let keys: Vec<PropertyKey> = keys.into_iter().map(Into::into).collect();
    project(record, |key| keys.contains(key))
}

/// Keep every present, non-`undefined` field except the listed ones.
pub fn omit<K, I>(record: &Record, keys: I) -> Record
where
    K: Into<PropertyKey>,
    I: IntoIterator<Item = K>,
{
    let keys: Vec<PropertyKey> = keys.into_iter().map(Into::into).collect();
    project(record, |key| !keys.contains(key))
}

fn project(record: &Record, keep: impl Fn(&PropertyKey) -> bool) -> Record {
    record
        .iter()
        .filter(|&(key, value)| keep(key) && !value.is_undefined())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Fold partial descriptors into one.  Absent entries are skipped; an empty
/// or all-absent sequence yields `None`.
pub fn merge<I>(descriptors: I) -> Option<Record>
where
    I: IntoIterator<Item = Option<Record>>,
{
    descriptors.into_iter().fold(None, combine)
}

/// [`merge`] over records that are all present.
pub fn merge_all<'a, I>(descriptors: I) -> Option<Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    merge(descriptors.into_iter().cloned().map(Some))
}

fn combine(carry: Option<Record>, incoming: Option<Record>) -> Option<Record> {
    let (carry, incoming) = match (carry, incoming) {
        (Some(carry), Some(incoming)) => (carry, incoming),
        (carry, None) => return carry,
        (None, incoming) => return incoming,
    };

    // Only the incoming record's fields decide what gets purged.
    let mut output = if incoming.has_any(&ACCESSOR_FIELDS) {
        omit(&carry, VALUE_FIELDS)
    } else if incoming.has_any(&VALUE_FIELDS) {
        omit(&carry, ACCESSOR_FIELDS)
    } else {
        carry
    };

    for (key, value) in incoming {
        output.insert(key, value);
    }

    if output.has(SET) && !output.has(GET) {
        output.insert(GET, Function::noop());
    }
    if output.has(WRITABLE) && !output.has(VALUE) {
        output.insert(VALUE, Value::Undefined);
    }

    Some(output)
}
