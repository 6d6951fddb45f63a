//! Rewrite queue configuration
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults
//! 2. Optional YAML file
//! 3. `REWRITE_QUEUE_*` environment variables

use crate::error::Result;
use crate::hooks::DEFAULT_PRIORITY;
use crate::repository::SqliteSnapshotStore;
use crate::snapshot::{MemorySnapshotStore, SnapshotStore};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "REWRITE_QUEUE_";

/// Option key the register snapshot is stored under
pub const DEFAULT_OPTION_KEY: &str = "rewrite_register";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Persistence key for the last built register
    #[serde(default = "default_option_key")]
    pub option_key: String,

    /// SQLite URL; in-memory storage when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Priority used by `RewriteQueue::add_producer`
    #[serde(default = "default_priority")]
    pub default_priority: i32,
}

fn default_option_key() -> String {
    DEFAULT_OPTION_KEY.to_string()
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            option_key: default_option_key(),
            database_url: None,
            default_priority: default_priority(),
        }
    }
}

impl QueueConfig {
    /// Load from defaults and environment only
    pub fn load() -> Result<Self> {
        Self::figment(None).extract().map_err(Into::into)
    }

    /// Load from defaults, a YAML file, then environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::figment(Some(path.as_ref()))
            .extract()
            .map_err(Into::into)
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(QueueConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }
}

/// Open the snapshot store selected by the configuration
pub async fn open_snapshot_store(config: &QueueConfig) -> Result<Arc<dyn SnapshotStore>> {
    match config.database_url.as_deref() {
        Some(url) => {
            info!("Using SQLite snapshot store");
            Ok(Arc::new(SqliteSnapshotStore::connect(url).await?))
        },
        None => {
            info!("Using in-memory snapshot store");
            Ok(Arc::new(MemorySnapshotStore::new()))
        },
    }
}
