use cafebot_core::TurnContext;
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;

use crate::bot_state::BotState;
use crate::error::StateError;

/// Typed handle to one named property of a [`BotState`].
pub struct StatePropertyAccessor<T> {
    state: BotState,
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for StatePropertyAccessor<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            name: self.name.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> StatePropertyAccessor<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub(crate) fn new(state: BotState, name: &str) -> Self {
        Self {
            state,
            name: name.to_string(),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value, or `None` when the property was never set (or was deleted).
    pub async fn get(&self, context: &TurnContext) -> Result<Option<T>, StateError> {
        match self.state.get_property_value(context, &self.name).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Current value; when unset, stores `T::default()` and returns it.
    pub async fn get_or_default(&self, context: &TurnContext) -> Result<T, StateError>
    where
        T: Default,
    {
        match self.get(context).await? {
            Some(value) => Ok(value),
            None => {
                let value = T::default();
                self.set(context, &value).await?;
                Ok(value)
            }
        }
    }

    pub async fn set(&self, context: &TurnContext, value: &T) -> Result<(), StateError> {
        self.state
            .set_property_value(context, &self.name, serde_json::to_value(value)?)
            .await
    }

    pub async fn delete(&self, context: &TurnContext) -> Result<(), StateError> {
        self.state.delete_property_value(context, &self.name).await
    }
}
