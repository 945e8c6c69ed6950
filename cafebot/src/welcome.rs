//! Greeting sent to participants who join the conversation.

use cafebot_core::{Activity, Attachment, Result, TurnContext};
use serde_json::Value;
use tracing::info;

/// Adaptive card template shown after the welcome text.
pub const WELCOME_CARD: &str = include_str!("../resources/welcome_card.json");

pub const WELCOME_MESSAGE: &str = "Hello and welcome! I am the cafe bot.";
pub const WELCOME_FOLLOW_UP: &str = "Here is what I can help you with:";

/// Sends the two welcome texts and the welcome card. Touches no state.
pub async fn welcome_user(context: &TurnContext) -> Result<()> {
    context.send_text(WELCOME_MESSAGE).await?;
    context.send_text(WELCOME_FOLLOW_UP).await?;

    let card: Value = serde_json::from_str(WELCOME_CARD)?;
    context
        .send_activity(Activity::attachment(Attachment::adaptive_card(card)))
        .await?;

    info!(
        conversation_id = %context.activity().conversation.id,
        "step: welcome sent"
    );
    Ok(())
}
