//! Process-local storage; contents are lost on restart.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StateError;
use crate::storage::{Storage, StoreItems};

/// [`Storage`] backed by a `HashMap` behind a tokio `RwLock`.
#[derive(Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn read(&self, keys: &[String]) -> Result<StoreItems, StateError> {
        let items = self.items.read().await;
        let found: StoreItems = keys
            .iter()
            .filter_map(|k| items.get(k).map(|v| (k.clone(), v.clone())))
            .collect();
        debug!(requested = keys.len(), found = found.len(), "MemoryStorage read");
        Ok(found)
    }

    async fn write(&self, changes: StoreItems) -> Result<(), StateError> {
        let mut items = self.items.write().await;
        debug!(count = changes.len(), "MemoryStorage write");
        items.extend(changes);
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StateError> {
        let mut items = self.items.write().await;
        for key in keys {
            items.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_write_read_delete() {
        let storage = MemoryStorage::new();
        let mut changes = StoreItems::new();
        changes.insert("a".to_string(), json!({"x": 1}));
        changes.insert("b".to_string(), json!({"y": 2}));
        storage.write(changes).await.unwrap();
        assert_eq!(storage.len().await, 2);

        let read = storage
            .read(&["a".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read["a"], json!({"x": 1}));

        storage.delete(&["a".to_string()]).await.unwrap();
        assert!(storage.read(&["a".to_string()]).await.unwrap().is_empty());
        assert!(!storage.is_empty().await);
    }
}
