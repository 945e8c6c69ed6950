//! Per-turn context: the inbound activity, the channel to reply on, and a turn-scoped state cache.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::channel::Channel;
use crate::error::Result;
use crate::types::Activity;

/// Context for a single turn. Created by the pipeline for each inbound activity and dropped after it.
pub struct TurnContext {
    activity: Activity,
    channel: Arc<dyn Channel>,
    turn_state: Mutex<HashMap<String, Value>>,
    responded: AtomicBool,
}

impl TurnContext {
    pub fn new(activity: Activity, channel: Arc<dyn Channel>) -> Self {
        Self {
            activity,
            channel,
            turn_state: Mutex::new(HashMap::new()),
            responded: AtomicBool::new(false),
        }
    }

    /// The inbound activity that started this turn.
    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    /// True once anything was sent during this turn.
    pub fn responded(&self) -> bool {
        self.responded.load(Ordering::SeqCst)
    }

    /// Addresses `activity` as a reply to the inbound activity and sends it.
    pub async fn send_activity(&self, mut activity: Activity) -> Result<()> {
        activity.apply_conversation_reference(&self.activity);
        debug!(
            conversation_id = %activity.conversation.id,
            has_text = activity.text.is_some(),
            attachments = activity.attachments.len(),
            "Sending activity"
        );
        self.channel.send_activity(&activity).await?;
        self.responded.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Sends a plain text message.
    pub async fn send_text(&self, text: &str) -> Result<()> {
        self.send_activity(Activity::message(text)).await
    }

    /// Reads a value from the turn-scoped cache.
    pub async fn turn_state(&self, key: &str) -> Option<Value> {
        self.turn_state.lock().await.get(key).cloned()
    }

    /// Writes a value into the turn-scoped cache.
    pub async fn set_turn_state(&self, key: &str, value: Value) {
        self.turn_state.lock().await.insert(key.to_string(), value);
    }

    pub async fn remove_turn_state(&self, key: &str) -> Option<Value> {
        self.turn_state.lock().await.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChannelAccount, ConversationAccount};
    use async_trait::async_trait;
    use serde_json::json;

    struct RecordingChannel {
        sent: std::sync::Mutex<Vec<Activity>>,
    }

    #[async_trait]
    impl Channel for RecordingChannel {
        async fn send_activity(&self, activity: &Activity) -> Result<()> {
            self.sent.lock().unwrap().push(activity.clone());
            Ok(())
        }
    }

    fn inbound() -> Activity {
        Activity {
            channel_id: "test".to_string(),
            conversation: ConversationAccount {
                id: "conv".to_string(),
                name: None,
            },
            from: ChannelAccount::new("user", "User"),
            recipient: ChannelAccount::new("bot", "Bot"),
            ..Activity::message("hello")
        }
    }

    #[tokio::test]
    async fn test_send_text_addresses_reply_and_marks_responded() {
        let channel = Arc::new(RecordingChannel {
            sent: std::sync::Mutex::new(Vec::new()),
        });
        let context = TurnContext::new(inbound(), channel.clone());
        assert!(!context.responded());

        context.send_text("hi there").await.unwrap();

        assert!(context.responded());
        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text.as_deref(), Some("hi there"));
        assert_eq!(sent[0].recipient.id, "user");
        assert_eq!(sent[0].conversation.id, "conv");
    }

    #[tokio::test]
    async fn test_turn_state_cache() {
        let channel = Arc::new(RecordingChannel {
            sent: std::sync::Mutex::new(Vec::new()),
        });
        let context = TurnContext::new(inbound(), channel);

        assert!(context.turn_state("k").await.is_none());
        context.set_turn_state("k", json!({"a": 1})).await;
        assert_eq!(context.turn_state("k").await, Some(json!({"a": 1})));
        assert_eq!(context.remove_turn_state("k").await, Some(json!({"a": 1})));
        assert!(context.turn_state("k").await.is_none());
    }
}
