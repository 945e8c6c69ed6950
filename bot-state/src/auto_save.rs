//! Middleware that persists bot state at the end of every successful turn.

use async_trait::async_trait;
use cafebot_core::{Middleware, Result, TurnContext};
use tracing::{info, instrument};

use crate::bot_state::BotState;

/// Calls [`BotState::save_changes`] for each registered state in `after()`.
pub struct AutoSaveStateMiddleware {
    states: Vec<BotState>,
}

impl AutoSaveStateMiddleware {
    pub fn new(states: Vec<BotState>) -> Self {
        Self { states }
    }
}

#[async_trait]
impl Middleware for AutoSaveStateMiddleware {
    #[instrument(skip(self, context))]
    async fn after(&self, context: &TurnContext) -> Result<()> {
        for state in &self.states {
            state.save_changes(context, false).await?;
        }
        info!(
            conversation_id = %context.activity().conversation.id,
            states = self.states.len(),
            "step: AutoSaveStateMiddleware after, state saved"
        );
        Ok(())
    }
}
