//! Console channel: talk to the bot from a terminal. Each input line is one message activity;
//! a line holding a JSON object is sent as a card submission (`value`) instead of text.

use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cafebot_core::{
    Activity, CafebotError, Channel, ChannelAccount, ConversationAccount, Result,
};
use chrono::Utc;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;
use turn_pipeline::TurnPipeline;

pub const CONSOLE_CHANNEL_ID: &str = "console";

/// Prints outbound activities. Cards are printed as their text blocks and action titles.
pub struct ConsoleChannel {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleChannel {
    pub fn stdout() -> Self {
        Self::with_writer(std::io::stdout())
    }

    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }
}

#[async_trait]
impl Channel for ConsoleChannel {
    async fn send_activity(&self, activity: &Activity) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| CafebotError::Channel("console writer lock poisoned".to_string()))?;
        let speaker = &activity.from.name;

        if let Some(text) = &activity.text {
            writeln!(writer, "{}: {}", speaker, text)?;
        }
        for attachment in &activity.attachments {
            match attachment.plain_text() {
                Some(text) => writeln!(writer, "{}", text)?,
                None => writeln!(writer, "{}: [{}]", speaker, attachment.content_type)?,
            }
        }
        writer.flush()?;
        Ok(())
    }
}

/// One console conversation between a local user and the bot.
pub struct ConsoleSession {
    conversation_id: String,
    user: ChannelAccount,
    bot: ChannelAccount,
}

impl ConsoleSession {
    pub fn new(bot_name: &str) -> Self {
        Self {
            conversation_id: uuid::Uuid::new_v4().to_string(),
            user: ChannelAccount::new("console-user", "You"),
            bot: ChannelAccount::new("cafebot", bot_name),
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    fn address(&self, mut activity: Activity) -> Activity {
        activity.id = Some(uuid::Uuid::new_v4().to_string());
        activity.timestamp = Some(Utc::now());
        activity.channel_id = CONSOLE_CHANNEL_ID.to_string();
        activity.conversation = ConversationAccount {
            id: self.conversation_id.clone(),
            name: None,
        };
        activity.from = self.user.clone();
        activity.recipient = self.bot.clone();
        activity
    }

    /// The activity announcing the bot and the user joined.
    pub fn conversation_update(&self) -> Activity {
        self.address(Activity::members_added(vec![
            self.bot.clone(),
            self.user.clone(),
        ]))
    }

    /// A message activity for one input line.
    pub fn activity_from_line(&self, line: &str) -> Activity {
        let trimmed = line.trim();
        let activity = match serde_json::from_str::<Value>(trimmed) {
            Ok(value @ Value::Object(_)) => Activity {
                value: Some(value),
                ..Activity::default()
            },
            _ => Activity::message(trimmed),
        };
        self.address(activity)
    }

    /// Sends the join update, then one turn per input line until EOF or `quit`.
    pub async fn run<R>(
        &self,
        pipeline: &TurnPipeline,
        channel: Arc<dyn Channel>,
        input: R,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        info!(conversation_id = %self.conversation_id, "step: console session started");
        pipeline
            .process_activity(self.conversation_update(), channel.clone())
            .await?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            if matches!(line.trim(), "quit" | "exit") {
                break;
            }
            pipeline
                .process_activity(self.activity_from_line(&line), channel.clone())
                .await?;
        }

        info!(conversation_id = %self.conversation_id, "step: console session ended");
        Ok(())
    }
}
