//! Rewrite Queue - registration pass, change check and build dispatch
//!
//! One pass:
//! 1. `begin_pass` empties the register
//! 2. `do_register_rule_sets` asks every producer to register
//! 3. `check` compares the register with the last saved snapshot
//! 4. On change, `build` saves the snapshot, resolves the queue, fires the
//!    build handlers per name in order, then the finalize handlers once
//!
//! Any change rebuilds every registered rule set.

use crate::config::{open_snapshot_store, QueueConfig};
use crate::error::Result;
use crate::hooks::{Hooks, RuleSetProducer};
use crate::queue::resolve;
use crate::register::RegistrationStore;
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::types::{Placement, RuleSetVersion};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Result of a change check
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// Register matches the last build; nothing was done
    Unchanged,
    /// Register changed and all rule sets were rebuilt
    Rebuilt(BuildReport),
}

impl CheckOutcome {
    pub fn is_rebuilt(&self) -> bool {
        matches!(self, CheckOutcome::Rebuilt(_))
    }
}

/// Summary of a build
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    /// Names in the order they were built
    pub queue: Vec<String>,
    /// Whether the new snapshot was saved
    pub persisted: bool,
}

/// Rule set ordering engine
pub struct RewriteQueue {
    config: QueueConfig,
    snapshots: Arc<dyn SnapshotStore>,
    register: RegistrationStore,
    /// Snapshot of the most recent build, as stored
    previous: Option<Snapshot>,
    queue: Vec<String>,
    hooks: Hooks,
}

impl RewriteQueue {
    /// Create an engine over a snapshot store. Call `init` before the first pass.
    pub fn new(snapshots: Arc<dyn SnapshotStore>, config: QueueConfig) -> Self {
        Self {
            config,
            snapshots,
            register: RegistrationStore::new(),
            previous: None,
            queue: Vec::new(),
            hooks: Hooks::new(),
        }
    }

    /// Open the configured store and load the cached register
    pub async fn from_config(config: QueueConfig) -> Result<Self> {
        let snapshots = open_snapshot_store(&config).await?;
        let mut queue = Self::new(snapshots, config);
        queue.init().await;
        Ok(queue)
    }

    /// Load the last saved register; a failed load counts as "never built"
    pub async fn init(&mut self) {
        self.previous = match self.snapshots.load(&self.config.option_key).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(
                    "Failed to load cached register {}: {:#}",
                    self.config.option_key, e
                );
                None
            },
        };
        debug!(
            "Cached register loaded: {}",
            if self.previous.is_some() { "found" } else { "none" }
        );
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    /// Add a producer at the configured default priority
    pub fn add_producer(&mut self, producer: impl RuleSetProducer + 'static) {
        let priority = self.config.default_priority;
        self.hooks.add_producer(priority, producer);
    }

    pub fn add_producer_with_priority(
        &mut self,
        priority: i32,
        producer: impl RuleSetProducer + 'static,
    ) {
        self.hooks.add_producer(priority, producer);
    }

    /// Register a set of rewrite rules directly
    pub fn register(
        &mut self,
        name: impl Into<String>,
        version: impl Into<RuleSetVersion>,
        placement: impl Into<Placement>,
    ) {
        self.register.register(name, version, placement);
    }

    pub fn registrations(&self) -> &RegistrationStore {
        &self.register
    }

    pub fn previous_snapshot(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    /// Queue from the most recent build
    pub fn queue(&self) -> &[String] {
        &self.queue
    }

    /// Start a fresh registration pass
    pub fn begin_pass(&mut self) {
        self.register.clear();
    }

    /// Fire the registration trigger
    pub fn do_register_rule_sets(&mut self) {
        self.hooks.fire_register(&mut self.register);
        debug!(
            "Registration finished: {} rule sets from {} producers",
            self.register.len(),
            self.hooks.producer_count()
        );
    }

    /// Rebuild everything if the register differs from the last build
    pub async fn check(&mut self) -> CheckOutcome {
        let current = self.register.snapshot();
        if self.previous.as_ref() == Some(&current) {
            debug!("Rewrite register unchanged, skipping rebuild");
            return CheckOutcome::Unchanged;
        }

        info!("Rewrite register changed, rebuilding all rules");
        CheckOutcome::Rebuilt(self.build_from(current).await)
    }

    /// Save the register, resolve the queue and fire the build handlers
    pub async fn build(&mut self) -> BuildReport {
        let current = self.register.snapshot();
        self.build_from(current).await
    }

    /// Begin a pass, run registration, then check
    pub async fn run_pass(&mut self) -> CheckOutcome {
        self.begin_pass();
        self.do_register_rule_sets();
        self.check().await
    }

    async fn build_from(&mut self, snapshot: Snapshot) -> BuildReport {
        let persisted = match self
            .snapshots
            .save(&self.config.option_key, &snapshot)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                error!(
                    "Failed to save register {}: {:#}",
                    self.config.option_key, e
                );
                false
            },
        };
        self.previous = Some(snapshot);

        self.queue = resolve(&self.register);

        for name in &self.queue {
            debug!("Building rewrite rules: {}", name);
            self.hooks.fire_build(name);
        }
        self.hooks.fire_finalize();

        info!("Rebuilt {} rule sets", self.queue.len());
        BuildReport {
            queue: self.queue.clone(),
            persisted,
        }
    }
}
