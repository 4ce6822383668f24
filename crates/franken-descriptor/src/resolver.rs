//! Effective descriptor resolution.
//!
//! [`get`] answers "what descriptor does `key` have on `target`?" even when
//! the key does not exist yet.  Existing keys report their own descriptor.
//! Missing keys are answered by a shadow probe: a throwaway object holding
//! only `key` (with the target's current, possibly inherited, value) is put
//! into the target's integrity level and then queried.  The real target is
//! only read, never written.
//!
//! [`DescriptorResolver`] wraps the same lookup with a context and an
//! in-memory structured event log.

use serde::{Deserialize, Serialize};

use crate::object_model::{ObjectError, ObjectHeap, OrdinaryObject, PropertyDescriptor};
use crate::value::{ObjectHandle, PropertyKey};

const COMPONENT: &str = "descriptor_resolver";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Correlation identifiers stamped on every resolution event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverContext {
    pub trace_id: String,
    pub decision_id: String,
    pub policy_id: String,
}

impl ResolverContext {
    pub fn new(
        trace_id: impl Into<String>,
        decision_id: impl Into<String>,
        policy_id: impl Into<String>,
    ) -> Self {
        Self {
            trace_id: trace_id.into(),
            decision_id: decision_id.into(),
            policy_id: policy_id.into(),
        }
    }
}

/// Which target integrity traits the shadow probe copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeMirroring {
    pub freeze: bool,
    pub seal: bool,
    pub prevent_extensions: bool,
}

impl Default for ProbeMirroring {
    fn default() -> Self {
        Self {
            freeze: true,
            seal: true,
            prevent_extensions: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub context: ResolverContext,
    pub mirroring: ProbeMirroring,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// The descriptor `key` has, or would have, on `target`.
///
/// Host errors (unknown handle, prototype cycle) are returned unchanged.
pub fn get(
    heap: &ObjectHeap,
    target: ObjectHandle,
    key: &PropertyKey,
) -> Result<PropertyDescriptor, ObjectError> {
    match heap.get_own_property_descriptor(target, key)? {
        Some(own) => Ok(own),
        None => shadow_probe(heap, target, key, ProbeMirroring::default()),
    }
}

/// Derive the descriptor of `key` from a placeholder object put into the
/// same integrity level as `target`.
pub fn shadow_probe(
    heap: &ObjectHeap,
    target: ObjectHandle,
    key: &PropertyKey,
    mirroring: ProbeMirroring,
) -> Result<PropertyDescriptor, ObjectError> {
    let current = heap.get_property(target, key)?;

    let mut probe = OrdinaryObject::default();
    probe
        .properties
        .insert(key.clone(), PropertyDescriptor::data(current));

    if mirroring.freeze && heap.is_frozen(target)? {
        probe.freeze();
    }
    if mirroring.seal && heap.is_sealed(target)? {
        probe.seal();
    }
    if mirroring.prevent_extensions && !heap.is_extensible(target)? {
        probe.prevent_extensions();
    }

    probe
        .properties
        .remove(key)
        .ok_or_else(|| ObjectError::TypeError(format!("shadow probe lost key {key}")))
}

// ---------------------------------------------------------------------------
// DescriptorResolver: logged resolution session
// ---------------------------------------------------------------------------

/// How a resolution was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    OwnDescriptor,
    ShadowProbe,
}

impl ResolutionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OwnDescriptor => "own_descriptor",
            Self::ShadowProbe => "shadow_probe",
        }
    }
}

/// Structured record of one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionEvent {
    pub seq: u64,
    pub trace_id: String,
    pub decision_id: String,
    pub policy_id: String,
    pub component: String,
    pub event: String,
    pub target: ObjectHandle,
    pub key: String,
    pub outcome: String,
    pub error_code: Option<String>,
}

/// Resolver that records every lookup it performs.
#[derive(Debug, Clone, Default)]
pub struct DescriptorResolver {
    config: ResolverConfig,
    events: Vec<ResolutionEvent>,
    next_seq: u64,
}

impl DescriptorResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            events: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Same answer as [`get`], honouring the configured mirroring, and
    /// logging the outcome.
    pub fn resolve(
        &mut self,
        heap: &ObjectHeap,
        target: ObjectHandle,
        key: &PropertyKey,
    ) -> Result<PropertyDescriptor, ObjectError> {
        let own = match heap.get_own_property_descriptor(target, key) {
            Ok(own) => own,
            Err(err) => {
                self.emit(ResolutionSource::OwnDescriptor, target, key, Err(&err));
                return Err(err);
            }
        };
        if let Some(own) = own {
            self.emit(ResolutionSource::OwnDescriptor, target, key, Ok(()));
            return Ok(own);
        }

        let probed = shadow_probe(heap, target, key, self.config.mirroring);
        self.emit(
            ResolutionSource::ShadowProbe,
            target,
            key,
            probed.as_ref().map(|_| ()),
        );
        probed
    }

    pub fn events(&self) -> &[ResolutionEvent] {
        &self.events
    }

    /// Hand the accumulated events to the caller.
    pub fn drain_events(&mut self) -> Vec<ResolutionEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(
        &mut self,
        source: ResolutionSource,
        target: ObjectHandle,
        key: &PropertyKey,
        result: Result<(), &ObjectError>,
    ) {
        let context = &self.config.context;
        let (outcome, error_code) = match result {
            Ok(()) => ("pass", None),
            Err(err) => ("fail", Some(err.error_code().to_string())),
        };
        self.events.push(ResolutionEvent {
            seq: self.next_seq,
            trace_id: context.trace_id.clone(),
            decision_id: context.decision_id.clone(),
            policy_id: context.policy_id.clone(),
            component: COMPONENT.to_string(),
            event: source.as_str().to_string(),
            target,
            key: key.to_string(),
            outcome: outcome.to_string(),
            error_code,
        });
        self.next_seq += 1;
    }
}
