//! SQLite-backed storage: one row per state key, JSON text in `value`.
//!
//! Uses SqlitePoolManager; callers go through the [`Storage`] trait.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use crate::error::StateError;
use crate::sqlite_pool::SqlitePoolManager;
use crate::storage::{Storage, StoreItems};

#[derive(Clone)]
pub struct SqliteStorage {
    pool_manager: SqlitePoolManager,
}

impl SqliteStorage {
    pub async fn new(database_path: &str) -> Result<Self, StateError> {
        let pool_manager = SqlitePoolManager::new(database_path).await?;
        let storage = Self { pool_manager };
        storage.init().await?;
        Ok(storage)
    }

    async fn init(&self) -> Result<(), StateError> {
        info!("Creating bot_state table if not exist");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bot_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(self.pool_manager.pool())
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn read(&self, keys: &[String]) -> Result<StoreItems, StateError> {
        let pool = self.pool_manager.pool();
        let mut items = StoreItems::new();

        for key in keys {
            let row: Option<(String,)> =
                sqlx::query_as("SELECT value FROM bot_state WHERE key = ?")
                    .bind(key)
                    .fetch_optional(pool)
                    .await?;
            if let Some((value,)) = row {
                items.insert(key.clone(), serde_json::from_str(&value)?);
            }
        }

        debug!(requested = keys.len(), found = items.len(), "SqliteStorage read");
        Ok(items)
    }

    async fn write(&self, changes: StoreItems) -> Result<(), StateError> {
        let mut tx = self.pool_manager.pool().begin().await?;
        let now = Utc::now();

        for (key, value) in &changes {
            let json = serde_json::to_string(value)?;
            sqlx::query(
                r#"
                INSERT INTO bot_state (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
            )
            .bind(key)
            .bind(json)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(count = changes.len(), "SqliteStorage write");
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StateError> {
        let pool = self.pool_manager.pool();
        for key in keys {
            sqlx::query("DELETE FROM bot_state WHERE key = ?")
                .bind(key)
                .execute(pool)
                .await?;
        }
        Ok(())
    }
}
