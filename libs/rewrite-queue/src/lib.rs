//! Rewrite Queue - Rule Set Ordering Library
//!
//! Lets producers register named, versioned rule sets with a placement
//! (`top`, `bottom`, or after another rule set) and provides:
//! - Deterministic build order resolution
//! - Change detection against the last built register
//! - Per-name build dispatch followed by a single finalize signal
//! - In-memory and SQLite snapshot persistence
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │  Producers  │────▶│   Register   │────▶│   Resolve   │
//! │ (priority)  │     │ (placements) │     │   (queue)   │
//! └─────────────┘     └──────────────┘     └─────────────┘
//!                            │                    │
//!                            ▼                    ▼
//!                     ┌──────────────┐     ┌─────────────┐
//!                     │SnapshotStore │     │    Hooks    │
//!                     │ (mem/SQLite) │     │(build/final)│
//!                     └──────────────┘     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use rewrite_queue::{resolve, Placement, RegistrationStore};
//!
//! let mut store = RegistrationStore::new();
//! store.register("core-top", "v1", Placement::Top);
//! store.register("posts", "v2", Placement::Bottom);
//! store.register("comments", "v1", "after:posts");
//!
//! assert_eq!(resolve(&store), vec!["core-top", "posts", "comments"]);
//! ```

pub mod config;
pub mod core_rules;
mod engine;
mod error;
pub mod hooks;
mod queue;
mod register;
mod repository;
mod snapshot;
pub mod types;

// Re-export public API
pub use config::{open_snapshot_store, QueueConfig, DEFAULT_OPTION_KEY};
pub use core_rules::{content_version, CoreRulesProducer, CORE_RULES_PRIORITY};
pub use engine::{BuildReport, CheckOutcome, RewriteQueue};
pub use error::{QueueError, Result};
pub use hooks::{Hooks, RuleSetProducer, DEFAULT_PRIORITY};
pub use queue::resolve;
pub use register::{Bucket, RegistrationStore};
pub use repository::SqliteSnapshotStore;
pub use snapshot::{MemorySnapshotStore, Snapshot, SnapshotStore};

// Re-export rule set types for convenience
pub use types::{Placement, Registration, RuleSetVersion};
