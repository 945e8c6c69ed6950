//! Core types: activity, accounts, attachments, and the handler/middleware traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::TurnContext;

/// Content type of adaptive card attachments.
pub const ADAPTIVE_CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";

/// Kind of activity. Unknown wire values are kept verbatim in [`ActivityType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    #[default]
    Message,
    /// Participants joined or left the conversation.
    ConversationUpdate,
    Typing,
    EndOfConversation,
    Event,
    Other(String),
}

impl ActivityType {
    pub fn as_str(&self) -> &str {
        match self {
            ActivityType::Message => "message",
            ActivityType::ConversationUpdate => "conversationUpdate",
            ActivityType::Typing => "typing",
            ActivityType::EndOfConversation => "endOfConversation",
            ActivityType::Event => "event",
            ActivityType::Other(s) => s,
        }
    }
}

impl From<String> for ActivityType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "message" => ActivityType::Message,
            "conversationUpdate" => ActivityType::ConversationUpdate,
            "typing" => ActivityType::Typing,
            "endOfConversation" => ActivityType::EndOfConversation,
            "event" => ActivityType::Event,
            _ => ActivityType::Other(s),
        }
    }
}

impl From<ActivityType> for String {
    fn from(t: ActivityType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A participant (user or bot) on a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAccount {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl ChannelAccount {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Conversation identity on a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// File, image or card attached to an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Attachment {
    /// Wraps an adaptive card JSON document as an attachment.
    pub fn adaptive_card(card: Value) -> Self {
        Self {
            content_type: ADAPTIVE_CARD_CONTENT_TYPE.to_string(),
            content: Some(card),
            content_url: None,
            name: None,
        }
    }

    pub fn is_adaptive_card(&self) -> bool {
        self.content_type == ADAPTIVE_CARD_CONTENT_TYPE
    }

    /// Text rendering of an adaptive card for channels without card support: every `TextBlock`
    /// text in document order, then one `[title]` line per action. `None` for other attachments.
    pub fn plain_text(&self) -> Option<String> {
        if !self.is_adaptive_card() {
            return None;
        }
        let card = self.content.as_ref()?;
        let mut lines = Vec::new();
        collect_text_blocks(card, &mut lines);
        if let Some(actions) = card.get("actions").and_then(Value::as_array) {
            for action in actions {
                if let Some(title) = action.get("title").and_then(Value::as_str) {
                    lines.push(format!("[{}]", title));
                }
            }
        }
        Some(lines.join("\n"))
    }
}

fn collect_text_blocks(node: &Value, lines: &mut Vec<String>) {
    match node {
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some("TextBlock") {
                if let Some(text) = map.get("text").and_then(Value::as_str) {
                    lines.push(text.to_string());
                }
            }
            for (key, child) in map {
                if key != "actions" {
                    collect_text_blocks(child, lines);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_text_blocks(item, lines);
            }
        }
        _ => {}
    }
}

/// One inbound or outbound event in a conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub conversation: ConversationAccount,
    #[serde(default)]
    pub from: ChannelAccount,
    #[serde(default)]
    pub recipient: ChannelAccount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Structured payload, e.g. an adaptive card submission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_added: Vec<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
}

impl Activity {
    /// Outbound text message; addressing is filled in by [`Activity::apply_conversation_reference`].
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            activity_type: ActivityType::Message,
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Outbound message carrying a single attachment.
    pub fn attachment(attachment: Attachment) -> Self {
        Self {
            activity_type: ActivityType::Message,
            attachments: vec![attachment],
            ..Default::default()
        }
    }

    /// Conversation update announcing `members` joined.
    pub fn members_added(members: Vec<ChannelAccount>) -> Self {
        Self {
            activity_type: ActivityType::ConversationUpdate,
            members_added: members,
            ..Default::default()
        }
    }

    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    /// Addresses this activity as a reply to `inbound` (swaps from/recipient, copies channel and conversation).
    pub fn apply_conversation_reference(&mut self, inbound: &Activity) {
        self.channel_id = inbound.channel_id.clone();
        self.conversation = inbound.conversation.clone();
        self.from = inbound.recipient.clone();
        self.recipient = inbound.from.clone();
        self.reply_to_id = inbound.id.clone();
        if self.timestamp.is_none() {
            self.timestamp = Some(Utc::now());
        }
    }
}

/// Receives every activity of a turn. The bot's turn logic implements this.
#[async_trait]
pub trait ActivityHandler: Send + Sync {
    async fn on_turn(&self, context: &TurnContext) -> crate::error::Result<()>;
}

/// Optional before/after hooks around the handler. Pipeline runs all before → handler → all after (reverse).
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Runs before the handler. Return false to stop the turn.
    async fn before(&self, _context: &TurnContext) -> crate::error::Result<bool> {
        Ok(true)
    }
    /// Runs after the handler succeeded, in reverse registration order.
    async fn after(&self, _context: &TurnContext) -> crate::error::Result<()> {
        Ok(())
    }
}
