//! Wraps teloxide::Bot and implements [`cafebot_core::Channel`]. Production replies go to Telegram;
//! tests substitute another Channel impl.

use async_trait::async_trait;
use cafebot_core::{Activity, CafebotError, Channel, Result};
use teloxide::{prelude::*, types::ChatId};
use tracing::debug;

/// Sends outbound activities to the Telegram chat named by `conversation.id`.
/// Telegram has no adaptive cards, so cards are sent as their plain-text rendering.
pub struct TelegramChannel {
    bot: teloxide::Bot,
}

impl TelegramChannel {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }

    async fn send_text(&self, chat_id: ChatId, text: String) -> Result<()> {
        self.bot
            .send_message(chat_id, text)
            .await
            .map_err(|e| CafebotError::Channel(e.to_string()))?;
        Ok(())
    }
}

fn chat_id(activity: &Activity) -> Result<ChatId> {
    activity
        .conversation
        .id
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| {
            CafebotError::Channel(format!(
                "invalid Telegram chat id: {:?}",
                activity.conversation.id
            ))
        })
}

#[async_trait]
impl Channel for TelegramChannel {
    async fn send_activity(&self, activity: &Activity) -> Result<()> {
        let chat = chat_id(activity)?;

        if let Some(text) = activity.text.as_ref().filter(|t| !t.is_empty()) {
            self.send_text(chat, text.clone()).await?;
        }
        for attachment in &activity.attachments {
            match attachment.plain_text() {
                Some(text) if !text.is_empty() => self.send_text(chat, text).await?,
                _ => debug!(
                    content_type = %attachment.content_type,
                    "Skipping attachment Telegram cannot render"
                ),
            }
        }
        Ok(())
    }
}
