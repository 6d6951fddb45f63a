//! Register snapshots and their persistence
//!
//! A snapshot is the full register contents at the end of a pass. Two snapshots
//! are equal only when they hold the same placement keys, names and versions in
//! the same order.

use crate::error::Result;
use crate::register::Bucket;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Deep, order-sensitive copy of a register
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    buckets: IndexMap<String, Bucket>,
}

impl Snapshot {
    pub fn new(buckets: IndexMap<String, Bucket>) -> Self {
        Self { buckets }
    }

    pub fn buckets(&self) -> &IndexMap<String, Bucket> {
        &self.buckets
    }

    /// Encode as JSON bytes for storage
    pub fn to_bytes(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    /// Encode as JSON text for storage
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON bytes, keeping key order
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

// IndexMap equality ignores order, so compare entry sequences directly.
impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.buckets.len() == other.buckets.len()
            && self
                .buckets
                .iter()
                .zip(other.buckets.iter())
                .all(|((key_a, bucket_a), (key_b, bucket_b))| {
                    key_a == key_b && bucket_a.iter().eq(bucket_b.iter())
                })
    }
}

/// Snapshot persistence backend
///
/// Implementations:
/// - `MemorySnapshotStore`: in-process store for tests and embedded use
/// - `SqliteSnapshotStore`: options table in SQLite
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the snapshot saved under `key`, if any
    async fn load(&self, key: &str) -> anyhow::Result<Option<Snapshot>>;

    /// Save `snapshot` under `key`, replacing any previous value
    async fn save(&self, key: &str, snapshot: &Snapshot) -> anyhow::Result<()>;
}

/// In-memory snapshot store
///
/// Snapshots are kept JSON-encoded so a load goes through the same decoding
/// path as a persistent backend.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    options: DashMap<String, Bytes>,
    writes: AtomicU64,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves since creation
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Raw stored value for a key
    pub fn raw(&self, key: &str) -> Option<Bytes> {
        self.options.get(key).map(|v| v.clone())
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.options.clear();
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, key: &str) -> anyhow::Result<Option<Snapshot>> {
        match self.options.get(key) {
            Some(bytes) => Ok(Some(Snapshot::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, snapshot: &Snapshot) -> anyhow::Result<()> {
        let bytes = snapshot.to_bytes()?;
        self.options.insert(key.to_string(), bytes);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
