//! Shared test doubles: a recording channel, a scripted recognizer and a pipeline harness.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bot_state::{AutoSaveStateMiddleware, BotState, MemoryStorage, Storage};
use cafebot::CafeBot;
use cafebot_core::{Activity, ActivityType, Attachment, Channel, ChannelAccount, ConversationAccount};
use luis_recognizer::{IntentRecognizer, RecognizerError, RecognizerResult};
use serde_json::{Map, Value};
use turn_pipeline::TurnPipeline;

pub const BOT_NAME: &str = "CafeBot";
pub const CONVERSATION_KEY: &str = "test/conversations/conv-1";
pub const USER_KEY: &str = "test/users/user-1";

/// Records every outbound activity.
#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<Activity>>,
}

impl RecordingChannel {
    pub fn sent(&self) -> Vec<Activity> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|activity| activity.text)
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    async fn send_activity(&self, activity: &Activity) -> cafebot_core::Result<()> {
        self.sent.lock().unwrap().push(activity.clone());
        Ok(())
    }
}

/// Returns queued results in order; the None intent once the queue is empty.
#[derive(Default)]
pub struct StubRecognizer {
    results: Mutex<VecDeque<Result<RecognizerResult, String>>>,
    calls: AtomicUsize,
}

impl StubRecognizer {
    pub fn push(&self, result: RecognizerResult) {
        self.results.lock().unwrap().push_back(Ok(result));
    }

    pub fn push_error(&self, body: &str) {
        self.results.lock().unwrap().push_back(Err(body.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IntentRecognizer for StubRecognizer {
    async fn recognize(&self, text: &str) -> Result<RecognizerResult, RecognizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.results.lock().unwrap().pop_front() {
            Some(Ok(result)) => Ok(result),
            Some(Err(body)) => Err(RecognizerError::Status { status: 500, body }),
            None => Ok(recognized_text(text, "None", Value::Object(Map::new()))),
        }
    }
}

/// A recognizer result with a single intent scored 0.9.
pub fn recognized(intent: &str, entities: Value) -> RecognizerResult {
    recognized_text("", intent, entities)
}

fn recognized_text(text: &str, intent: &str, entities: Value) -> RecognizerResult {
    RecognizerResult {
        text: text.to_string(),
        intents: [(intent.to_string(), 0.9)].into_iter().collect(),
        entities: match entities {
            Value::Object(map) => map,
            _ => Map::new(),
        },
    }
}

fn addressed(mut activity: Activity) -> Activity {
    activity.channel_id = "test".to_string();
    activity.conversation = ConversationAccount {
        id: "conv-1".to_string(),
        name: None,
    };
    activity.from = ChannelAccount::new("user-1", "Ann");
    activity.recipient = ChannelAccount::new("bot", BOT_NAME);
    activity
}

pub fn message(text: &str) -> Activity {
    addressed(Activity::message(text))
}

pub fn card_submission(value: Value) -> Activity {
    addressed(Activity {
        value: Some(value),
        ..Activity::default()
    })
}

pub fn with_attachment(text: &str) -> Activity {
    let mut activity = message(text);
    activity.attachments.push(Attachment {
        content_type: "image/png".to_string(),
        content: None,
        content_url: Some("https://example.com/menu.png".to_string()),
        name: Some("menu.png".to_string()),
    });
    activity
}

pub fn members_added(names: &[&str]) -> Activity {
    let members = names
        .iter()
        .map(|name| {
            if *name == BOT_NAME {
                ChannelAccount::new("bot", *name)
            } else {
                ChannelAccount::new("user-1", *name)
            }
        })
        .collect();
    addressed(Activity::members_added(members))
}

pub fn typing() -> Activity {
    addressed(Activity {
        activity_type: ActivityType::Typing,
        ..Activity::default()
    })
}

/// CafeBot behind a pipeline with auto-save and no error hook, over memory storage.
pub struct Harness {
    pub storage: Arc<MemoryStorage>,
    pub recognizer: Arc<StubRecognizer>,
    pub channel: Arc<RecordingChannel>,
    pub pipeline: TurnPipeline,
}

impl Harness {
    pub fn new() -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let recognizer = Arc::new(StubRecognizer::default());
        let conversation_state = BotState::conversation(storage.clone());
        let user_state = BotState::user(storage.clone());

        let bot = CafeBot::new(
            conversation_state.clone(),
            user_state.clone(),
            recognizer.clone(),
            BOT_NAME,
        )
        .unwrap();
        let pipeline = TurnPipeline::new(Arc::new(bot)).add_middleware(Arc::new(
            AutoSaveStateMiddleware::new(vec![conversation_state, user_state]),
        ));

        Self {
            storage,
            recognizer,
            channel: Arc::new(RecordingChannel::default()),
            pipeline,
        }
    }

    pub async fn send(&self, activity: Activity) -> cafebot_core::Result<()> {
        self.pipeline
            .process_activity(activity, self.channel.clone())
            .await
    }

    /// Persisted document under `key`, if any.
    pub async fn stored(&self, key: &str) -> Option<Value> {
        let key = key.to_string();
        self.storage
            .read(std::slice::from_ref(&key))
            .await
            .unwrap()
            .remove(&key)
    }

    pub async fn conversation_state(&self) -> Value {
        self.stored(CONVERSATION_KEY)
            .await
            .expect("conversation state saved")
    }

    /// Ids on the persisted dialog stack, bottom first.
    pub async fn dialog_stack(&self) -> Vec<String> {
        self.conversation_state().await["dialogState"]["dialogStack"]
            .as_array()
            .map(|stack| {
                stack
                    .iter()
                    .filter_map(|instance| instance["id"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
