//! Scoped bot state: one JSON object per conversation or per user, cached in the turn context.
//!
//! `load` reads the object from storage at most once per turn; property accessors read and write
//! the cached copy; `save_changes` writes it back only when it changed since it was loaded.

use cafebot_core::{Activity, TurnContext};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::accessor::StatePropertyAccessor;
use crate::error::StateError;
use crate::storage::{Storage, StoreItems};

/// Which identity the state is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateScope {
    Conversation,
    User,
}

/// Turn-cache entry: the live state object and the JSON text it had when loaded or last saved.
#[derive(Debug, Serialize, Deserialize)]
struct CachedBotState {
    state: Map<String, Value>,
    hash: String,
}

/// State of one scope backed by a [`Storage`].
#[derive(Clone)]
pub struct BotState {
    scope: StateScope,
    state_name: String,
    storage: Arc<dyn Storage>,
}

impl BotState {
    /// Conversation-scoped state (`{channel}/conversations/{conversation id}`).
    pub fn conversation(storage: Arc<dyn Storage>) -> Self {
        Self {
            scope: StateScope::Conversation,
            state_name: "ConversationState".to_string(),
            storage,
        }
    }

    /// User-scoped state (`{channel}/users/{sender id}`).
    pub fn user(storage: Arc<dyn Storage>) -> Self {
        Self {
            scope: StateScope::User,
            state_name: "UserState".to_string(),
            storage,
        }
    }

    pub fn scope(&self) -> StateScope {
        self.scope
    }

    /// Storage key for the activity's conversation or sender.
    pub fn storage_key(&self, activity: &Activity) -> Result<String, StateError> {
        if activity.channel_id.is_empty() {
            return Err(StateError::MissingKeyPart("channel id"));
        }
        match self.scope {
            StateScope::Conversation => {
                if activity.conversation.id.is_empty() {
                    return Err(StateError::MissingKeyPart("conversation id"));
                }
                Ok(format!(
                    "{}/conversations/{}",
                    activity.channel_id, activity.conversation.id
                ))
            }
            StateScope::User => {
                if activity.from.id.is_empty() {
                    return Err(StateError::MissingKeyPart("sender id"));
                }
                Ok(format!("{}/users/{}", activity.channel_id, activity.from.id))
            }
        }
    }

    /// Creates a typed accessor for the property `name` of this state.
    pub fn create_property<T>(&self, name: &str) -> StatePropertyAccessor<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        StatePropertyAccessor::new(self.clone(), name)
    }

    /// Reads the state into the turn cache. Without `force`, an already cached state is kept.
    #[instrument(skip(self, context), fields(state = %self.state_name))]
    pub async fn load(&self, context: &TurnContext, force: bool) -> Result<(), StateError> {
        if !force && context.turn_state(&self.state_name).await.is_some() {
            return Ok(());
        }

        let key = self.storage_key(context.activity())?;
        let mut items = self.storage.read(std::slice::from_ref(&key)).await?;
        let state = match items.remove(&key) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let hash = serde_json::to_string(&state)?;
        debug!(key = %key, properties = state.len(), "State loaded");

        self.put_cache(context, CachedBotState { state, hash }).await
    }

    /// Writes the cached state back when it changed (or always with `force`).
    #[instrument(skip(self, context), fields(state = %self.state_name))]
    pub async fn save_changes(&self, context: &TurnContext, force: bool) -> Result<(), StateError> {
        let Some(mut cached) = self.cache(context).await? else {
            return Ok(());
        };

        let current = serde_json::to_string(&cached.state)?;
        if !force && current == cached.hash {
            debug!("State unchanged, skipping write");
            return Ok(());
        }

        let key = self.storage_key(context.activity())?;
        let mut changes = StoreItems::new();
        changes.insert(key.clone(), Value::Object(cached.state.clone()));
        self.storage.write(changes).await?;
        debug!(key = %key, "State saved");

        cached.hash = current;
        self.put_cache(context, cached).await
    }

    /// Empties the cached state; the next `save_changes` persists the empty object.
    pub async fn clear(&self, context: &TurnContext) -> Result<(), StateError> {
        let hash = match self.cache(context).await? {
            Some(cached) => cached.hash,
            None => String::new(),
        };
        self.put_cache(
            context,
            CachedBotState {
                state: Map::new(),
                hash,
            },
        )
        .await
    }

    /// Drops the cached state and removes it from storage.
    pub async fn delete(&self, context: &TurnContext) -> Result<(), StateError> {
        context.remove_turn_state(&self.state_name).await;
        let key = self.storage_key(context.activity())?;
        self.storage.delete(&[key]).await
    }

    pub(crate) async fn get_property_value(
        &self,
        context: &TurnContext,
        name: &str,
    ) -> Result<Option<Value>, StateError> {
        self.load(context, false).await?;
        Ok(self
            .cache(context)
            .await?
            .and_then(|mut cached| cached.state.remove(name)))
    }

    pub(crate) async fn set_property_value(
        &self,
        context: &TurnContext,
        name: &str,
        value: Value,
    ) -> Result<(), StateError> {
        self.load(context, false).await?;
        if let Some(mut cached) = self.cache(context).await? {
            cached.state.insert(name.to_string(), value);
            self.put_cache(context, cached).await?;
        }
        Ok(())
    }

    pub(crate) async fn delete_property_value(
        &self,
        context: &TurnContext,
        name: &str,
    ) -> Result<(), StateError> {
        self.load(context, false).await?;
        if let Some(mut cached) = self.cache(context).await? {
            cached.state.remove(name);
            self.put_cache(context, cached).await?;
        }
        Ok(())
    }

    async fn cache(&self, context: &TurnContext) -> Result<Option<CachedBotState>, StateError> {
        match context.turn_state(&self.state_name).await {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn put_cache(&self, context: &TurnContext, cached: CachedBotState) -> Result<(), StateError> {
        context
            .set_turn_state(&self.state_name, serde_json::to_value(cached)?)
            .await;
        Ok(())
    }
}
