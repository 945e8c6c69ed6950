//! Adapters from Telegram (teloxide) types to cafebot_core types.

use cafebot_core::{
    Activity, ActivityType, Attachment, ChannelAccount, ConversationAccount,
};
use teloxide::types::MessageKind;

/// `channel_id` of activities coming from Telegram.
pub const TELEGRAM_CHANNEL_ID: &str = "telegram";

/// Wraps a teloxide User for conversion to a [`ChannelAccount`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> TelegramUserWrapper<'a> {
    /// Id is the Telegram user id; name is the first name (what the welcome check compares).
    pub fn to_account(&self) -> ChannelAccount {
        ChannelAccount::new(self.0.id.0.to_string(), self.0.first_name.clone())
    }
}

/// Wraps a teloxide Message for conversion to an inbound [`Activity`].
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> TelegramMessageWrapper<'a> {
    /// Members joining become a conversation update listing them. Other service messages (member
    /// left, pins, title changes, ...) become a conversation update with nobody added. Common
    /// messages become message activities, with photos and documents carried as attachments.
    pub fn to_activity(&self, bot_account: &ChannelAccount) -> Activity {
        let msg = self.0;
        let mut activity = match (&msg.kind, msg.new_chat_members()) {
            (_, Some(members)) => Activity::members_added(
                members
                    .iter()
                    .map(|u| TelegramUserWrapper(u).to_account())
                    .collect(),
            ),
            (MessageKind::Common(_), None) => Activity {
                activity_type: ActivityType::Message,
                text: msg.text().or_else(|| msg.caption()).map(str::to_string),
                attachments: self.attachments(),
                ..Activity::default()
            },
            _ => Activity {
                activity_type: ActivityType::ConversationUpdate,
                ..Activity::default()
            },
        };

        activity.id = Some(msg.id.to_string());
        activity.timestamp = Some(msg.date);
        activity.channel_id = TELEGRAM_CHANNEL_ID.to_string();
        activity.conversation = ConversationAccount {
            id: msg.chat.id.0.to_string(),
            name: msg.chat.title().map(str::to_string),
        };
        activity.from = msg
            .from
            .as_ref()
            .map(|u| TelegramUserWrapper(u).to_account())
            .unwrap_or_default();
        activity.recipient = bot_account.clone();
        activity
    }

    fn attachments(&self) -> Vec<Attachment> {
        let mut attachments = Vec::new();
        if let Some(largest) = self.0.photo().and_then(|sizes| sizes.last()) {
            attachments.push(Attachment {
                content_type: "image/jpeg".to_string(),
                content: None,
                content_url: Some(largest.file.id.to_string()),
                name: None,
            });
        }
        if let Some(document) = self.0.document() {
            attachments.push(Attachment {
                content_type: document
                    .mime_type
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
                content: None,
                content_url: Some(document.file.id.to_string()),
                name: document.file_name.clone(),
            });
        }
        attachments
    }
}
