//! Turn dispatcher: branches on the activity type, derives [`TurnProperties`] for messages,
//! persists them and drives the dialog stack; welcomes members who join.

use std::sync::Arc;

use async_trait::async_trait;
use bot_state::{BotState, StatePropertyAccessor, StateScope};
use cafebot_core::{ActivityHandler, ActivityType, CafebotError, Result, TurnContext};
use dialogs::{DialogSet, DialogState, DialogTurnResult, DialogTurnStatus};
use luis_recognizer::IntentRecognizer;
use tracing::{debug, info, instrument};

use crate::cafe_dialogs::{
    BookTableDialog, MainDispatcher, UserProfile, MAIN_DISPATCHER_DIALOG, USER_PROFILE_PROPERTY,
};
use crate::turn_properties::{
    TurnProperties, DIALOG_STATE_PROPERTY, ON_TURN_PROPERTY, RECOGNIZED_ENTITIES,
};
use crate::welcome::welcome_user;

/// Reply to messages that carry attachments.
pub const ATTACHMENTS_MESSAGE: &str = "Sorry, I cannot process attachments yet.";

/// Reply to an empty message when nothing else was sent this turn.
pub const EMPTY_INPUT_MESSAGE: &str = "Say something, or pick an option from the card.";

/// The cafe bot's [`ActivityHandler`].
pub struct CafeBot {
    on_turn_property: StatePropertyAccessor<TurnProperties>,
    dialogs: DialogSet,
    recognizer: Arc<dyn IntentRecognizer>,
    bot_name: String,
}

impl CafeBot {
    /// Registers the dialogs on the conversation state. Both states must have the matching scope.
    pub fn new(
        conversation_state: BotState,
        user_state: BotState,
        recognizer: Arc<dyn IntentRecognizer>,
        bot_name: impl Into<String>,
    ) -> Result<Self> {
        if conversation_state.scope() != StateScope::Conversation {
            return Err(CafebotError::Config(
                "conversation state must be conversation-scoped".to_string(),
            ));
        }
        if user_state.scope() != StateScope::User {
            return Err(CafebotError::Config(
                "user state must be user-scoped".to_string(),
            ));
        }

        let on_turn_property = conversation_state.create_property::<TurnProperties>(ON_TURN_PROPERTY);
        let dialog_state = conversation_state.create_property::<DialogState>(DIALOG_STATE_PROPERTY);
        let user_profile = user_state.create_property::<UserProfile>(USER_PROFILE_PROPERTY);

        let mut dialogs = DialogSet::new(dialog_state);
        dialogs
            .add(Arc::new(MainDispatcher::new(
                on_turn_property.clone(),
                user_profile,
            )))?
            .add(Arc::new(BookTableDialog::new(on_turn_property.clone())))?;

        Ok(Self {
            on_turn_property,
            dialogs,
            recognizer,
            bot_name: bot_name.into(),
        })
    }

    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }

    /// Derives the turn's properties, first match wins: card submission (`value`), attachments
    /// (acknowledged, nothing derived), blank text (nothing derived), then the recognizer.
    pub async fn derive_turn_properties(
        &self,
        context: &TurnContext,
    ) -> Result<Option<TurnProperties>> {
        let activity = context.activity();

        if let Some(value) = &activity.value {
            debug!("Deriving turn properties from card input");
            return Ok(Some(TurnProperties::from_card_input(value)));
        }

        if activity.has_attachments() {
            info!(
                attachments = activity.attachments.len(),
                "step: attachments received, acknowledging"
            );
            context.send_text(ATTACHMENTS_MESSAGE).await?;
            return Ok(None);
        }

        let text = activity.text.as_deref().unwrap_or_default();
        if text.trim().is_empty() {
            debug!("Empty message text, nothing to derive");
            return Ok(None);
        }

        let result = self.recognizer.recognize(text).await?;
        Ok(Some(TurnProperties::from_recognizer_result(
            &result,
            &RECOGNIZED_ENTITIES,
        )))
    }

    /// Continues the active dialog; begins the main dispatcher when none is active.
    pub async fn continue_or_begin_main_dialog(
        &self,
        context: &TurnContext,
    ) -> Result<DialogTurnResult> {
        let mut dc = self.dialogs.create_context(context).await?;
        let result = dc.continue_dialog().await?;
        if result.status == DialogTurnStatus::Empty {
            info!("step: no active dialog, beginning main dispatcher");
            return dc.begin_dialog(MAIN_DISPATCHER_DIALOG, None).await;
        }
        Ok(result)
    }

    #[instrument(skip(self, context), fields(conversation_id = %context.activity().conversation.id))]
    async fn on_message(&self, context: &TurnContext) -> Result<()> {
        let Some(properties) = self.derive_turn_properties(context).await? else {
            if !context.responded() {
                context.send_text(EMPTY_INPUT_MESSAGE).await?;
            }
            return Ok(());
        };

        info!(
            intent = ?properties.intent(),
            entities = properties.entities().len(),
            "step: turn properties derived"
        );
        self.on_turn_property.set(context, &properties).await?;

        let result = self.continue_or_begin_main_dialog(context).await?;
        debug!(status = ?result.status, "Dialog turn finished");
        Ok(())
    }

    async fn on_conversation_update(&self, context: &TurnContext) -> Result<()> {
        for member in &context.activity().members_added {
            if member.name == self.bot_name {
                continue;
            }
            info!(member_id = %member.id, "step: member joined, sending welcome");
            welcome_user(context).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ActivityHandler for CafeBot {
    async fn on_turn(&self, context: &TurnContext) -> Result<()> {
        match &context.activity().activity_type {
            ActivityType::Message => self.on_message(context).await,
            ActivityType::ConversationUpdate => self.on_conversation_update(context).await,
            other => {
                debug!(activity_type = %other, "Ignoring activity");
                Ok(())
            }
        }
    }
}
