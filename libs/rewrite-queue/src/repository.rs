//! Snapshot repository - SQLite persistence for the rewrite register
//!
//! Stores each snapshot as JSON text in a small key/value options table.

use crate::error::Result;
use crate::snapshot::{Snapshot, SnapshotStore};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

/// SQLite-backed snapshot store
#[derive(Debug, Clone)]
pub struct SqliteSnapshotStore {
    pool: SqlitePool,
}

impl SqliteSnapshotStore {
    /// Wrap an existing pool and make sure the options table exists
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS options (
                option_key TEXT PRIMARY KEY,
                option_value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    /// Connect to a database URL (e.g. `sqlite://data/rewrites.db?mode=rwc`)
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(url).await?;
        Self::new(pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn load(&self, key: &str) -> anyhow::Result<Option<Snapshot>> {
        let row = sqlx::query(
            r#"
            SELECT option_value
            FROM options
            WHERE option_key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to load option {}", key))?;

        match row {
            Some(row) => {
                let value: String = row.try_get("option_value")?;
                Ok(Some(Snapshot::from_bytes(value.as_bytes())?))
            },
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, snapshot: &Snapshot) -> anyhow::Result<()> {
        let value = snapshot.to_json()?;

        sqlx::query(
            r#"
            INSERT INTO options (option_key, option_value)
            VALUES (?, ?)
            ON CONFLICT(option_key) DO UPDATE SET
                option_value = excluded.option_value,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(key)
        .bind(&value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to save option {}", key))?;

        Ok(())
    }
}
