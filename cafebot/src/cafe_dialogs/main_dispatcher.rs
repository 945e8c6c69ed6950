use async_trait::async_trait;
use bot_state::StatePropertyAccessor;
use cafebot_core::{Result, TurnContext};
use dialogs::{Dialog, DialogContext, DialogTurnResult};
use serde_json::Value;
use tracing::{debug, info};

use super::{
    display_value, UserProfile, BOOK_TABLE_DIALOG, BOOK_TABLE_INTENT, CANCEL_INTENT,
    GREETING_INTENT, USER_NAME_ENTITY, WHAT_CAN_YOU_DO_INTENT, WHO_ARE_YOU_INTENT,
};
use crate::turn_properties::TurnProperties;

/// Id of the root dialog begun when nothing is active.
pub const MAIN_DISPATCHER_DIALOG: &str = "mainDispatcher";

pub const WHO_ARE_YOU_MESSAGE: &str =
    "I am the cafe bot. I take table reservations and answer questions about the cafe.";
pub const WHAT_CAN_YOU_DO_MESSAGE: &str =
    "I can book a table for you. Try \"book a table for 4 tomorrow at 7pm in Seattle\".";
pub const NOTHING_TO_CANCEL_MESSAGE: &str = "There is nothing to cancel right now.";
pub const NOT_UNDERSTOOD_MESSAGE: &str =
    "Sorry, I did not understand that. Ask me what I can do to see the options.";

/// Routes the turn's intent: `BookTable` starts the booking dialog, the other known intents get a
/// fixed reply, anything else gets the not-understood reply. Ends in the same turn unless a child
/// dialog is waiting.
pub struct MainDispatcher {
    on_turn_property: StatePropertyAccessor<TurnProperties>,
    user_profile: StatePropertyAccessor<UserProfile>,
}

impl MainDispatcher {
    pub fn new(
        on_turn_property: StatePropertyAccessor<TurnProperties>,
        user_profile: StatePropertyAccessor<UserProfile>,
    ) -> Self {
        Self {
            on_turn_property,
            user_profile,
        }
    }

    /// Stores a `UserName` entity in the profile and returns the name the bot knows the user by.
    async fn remember_user_name(
        &self,
        context: &TurnContext,
        properties: &TurnProperties,
    ) -> Result<Option<String>> {
        let mut profile = self.user_profile.get(context).await?.unwrap_or_default();
        if let Some(entity) = properties.entity(USER_NAME_ENTITY) {
            let name = display_value(entity.first_value());
            if !name.trim().is_empty() && profile.name.as_deref() != Some(name.as_str()) {
                info!(user_id = %context.activity().from.id, "step: user name stored");
                profile.name = Some(name);
                self.user_profile.set(context, &profile).await?;
            }
        }
        Ok(profile.name)
    }
}

#[async_trait]
impl Dialog for MainDispatcher {
    fn id(&self) -> &str {
        MAIN_DISPATCHER_DIALOG
    }

    async fn begin_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        _options: Option<Value>,
    ) -> Result<DialogTurnResult> {
        let context = dc.context();
        let properties = self
            .on_turn_property
            .get(context)
            .await?
            .unwrap_or_default();
        debug!(intent = ?properties.intent(), "Dispatching turn");
        let user_name = self.remember_user_name(context, &properties).await?;

        let reply = match properties.intent() {
            Some(BOOK_TABLE_INTENT) => return dc.begin_dialog(BOOK_TABLE_DIALOG, None).await,
            Some(WHO_ARE_YOU_INTENT) => WHO_ARE_YOU_MESSAGE.to_string(),
            Some(WHAT_CAN_YOU_DO_INTENT) => WHAT_CAN_YOU_DO_MESSAGE.to_string(),
            Some(GREETING_INTENT) => match user_name {
                Some(name) => format!("Hi {}! How can I help you today?", name),
                None => "Hi! How can I help you today?".to_string(),
            },
            Some(CANCEL_INTENT) => NOTHING_TO_CANCEL_MESSAGE.to_string(),
            _ => NOT_UNDERSTOOD_MESSAGE.to_string(),
        };

        context.send_text(&reply).await?;
        dc.end_dialog(None).await
    }
}
