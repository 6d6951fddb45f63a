//! Rule set register
//!
//! Accumulates registrations for a pass: placement key → ordered {name → version}.
//! Insertion order of placement keys and of names inside a bucket is kept, since
//! both feed into the build order.

use crate::snapshot::Snapshot;
use crate::types::{Placement, Registration, RuleSetVersion};
use indexmap::IndexMap;
use tracing::debug;

/// Names registered under one placement key, in registration order
pub type Bucket = IndexMap<String, RuleSetVersion>;

/// Registration store for a single pass
#[derive(Debug, Clone, Default)]
pub struct RegistrationStore {
    buckets: IndexMap<String, Bucket>,
}

impl RegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `name` (at `version`) should be placed at `placement`
    ///
    /// Registering the same name under the same placement again overwrites the
    /// version and keeps the original position. The same name under another
    /// placement is a separate entry.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        version: impl Into<RuleSetVersion>,
        placement: impl Into<Placement>,
    ) {
        let name = name.into();
        let version = version.into();
        let placement = placement.into();
        debug!("Register rule set {} ({}) at {}", name, version, placement);

        self.buckets
            .entry(placement.key().to_string())
            .or_default()
            .insert(name, version);
    }

    /// Register at the default placement (bottom)
    pub fn register_default(
        &mut self,
        name: impl Into<String>,
        version: impl Into<RuleSetVersion>,
    ) {
        self.register(name, version, Placement::default());
    }

    /// Record a prepared registration
    pub fn insert(&mut self, registration: Registration) {
        self.register(
            registration.name,
            registration.version,
            registration.placement,
        );
    }

    /// Bucket registered under a placement key
    pub fn bucket(&self, key: &str) -> Option<&Bucket> {
        self.buckets.get(key)
    }

    /// Placement keys in the order they were first introduced
    pub fn placement_keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Total number of (placement, name) entries
    pub fn len(&self) -> usize {
        self.buckets.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Drop all registrations, ready for a fresh pass
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Deep copy of the current contents for change detection
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.buckets.clone())
    }
}
