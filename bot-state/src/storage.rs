use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::StateError;

/// Key → JSON document map exchanged with a [`Storage`].
pub type StoreItems = HashMap<String, Value>;

/// Key/value store for bot state. Missing keys are simply absent from `read` results.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn read(&self, keys: &[String]) -> Result<StoreItems, StateError>;
    /// Inserts or replaces every entry in `changes`.
    async fn write(&self, changes: StoreItems) -> Result<(), StateError>;
    async fn delete(&self, keys: &[String]) -> Result<(), StateError>;
}
