//! Integration tests for [`dialogs::DialogSet`] and [`dialogs::DialogContext`].
//!
//! Covers: continue on an empty stack, begin/continue across turns with persisted state,
//! child completion resuming the parent, cancel, and registration errors.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bot_state::{BotState, MemoryStorage};
use cafebot_core::{Activity, CafebotError, Channel, ChannelAccount, ConversationAccount, Result, TurnContext};
use dialogs::{Dialog, DialogContext, DialogError, DialogSet, DialogState, DialogTurnResult, DialogTurnStatus};
use serde_json::{json, Value};

#[derive(Default)]
struct RecordingChannel {
    sent: Mutex<Vec<String>>,
}

#[async_trait]
impl Channel for RecordingChannel {
    async fn send_activity(&self, activity: &Activity) -> Result<()> {
        if let Some(text) = &activity.text {
            self.sent.lock().unwrap().push(text.clone());
        }
        Ok(())
    }
}

fn turn(text: &str, channel: Arc<RecordingChannel>) -> TurnContext {
    let activity = Activity {
        channel_id: "test".to_string(),
        conversation: ConversationAccount {
            id: "conv-1".to_string(),
            name: None,
        },
        from: ChannelAccount::new("user-1", "Ann"),
        recipient: ChannelAccount::new("bot", "CafeBot"),
        ..Activity::message(text)
    };
    TurnContext::new(activity, channel)
}

/// Asks for a name on begin, stores the reply on continue, then ends with it.
struct AskNameDialog;

#[async_trait]
impl Dialog for AskNameDialog {
    fn id(&self) -> &str {
        "askName"
    }

    async fn begin_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        _options: Option<Value>,
    ) -> Result<DialogTurnResult> {
        dc.context().send_text("What is your name?").await?;
        let mut state = serde_json::Map::new();
        state.insert("asked".to_string(), Value::Bool(true));
        dc.set_instance_state(state).await?;
        Ok(DialogTurnResult::waiting())
    }

    async fn continue_dialog(&self, dc: &mut DialogContext<'_>) -> Result<DialogTurnResult> {
        assert_eq!(dc.instance_state().unwrap()["asked"], json!(true));
        let name = dc.context().activity().text.clone().unwrap_or_default();
        dc.end_dialog(Some(Value::String(name))).await
    }
}

/// Begins askName and greets with its result when resumed.
struct RootDialog;

#[async_trait]
impl Dialog for RootDialog {
    fn id(&self) -> &str {
        "root"
    }

    async fn begin_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        _options: Option<Value>,
    ) -> Result<DialogTurnResult> {
        dc.begin_dialog("askName", None).await
    }

    async fn resume_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        result: Option<Value>,
    ) -> Result<DialogTurnResult> {
        let name = result.as_ref().and_then(Value::as_str).unwrap_or("stranger").to_string();
        dc.context().send_text(&format!("Nice to meet you, {name}.")).await?;
        dc.end_dialog(result).await
    }
}

fn dialog_set(state: &BotState) -> DialogSet {
    let mut dialogs = DialogSet::new(state.create_property::<DialogState>("dialogState"));
    dialogs.add(Arc::new(RootDialog)).unwrap();
    dialogs.add(Arc::new(AskNameDialog)).unwrap();
    dialogs
}

/// **Test: Continue with nothing on the stack reports Empty and sends nothing.**
#[tokio::test]
async fn test_continue_on_empty_stack() {
    let state = BotState::conversation(Arc::new(MemoryStorage::new()));
    let dialogs = dialog_set(&state);
    let channel = Arc::new(RecordingChannel::default());
    let ctx = turn("hi", channel.clone());

    let mut dc = dialogs.create_context(&ctx).await.unwrap();
    let result = dc.continue_dialog().await.unwrap();

    assert_eq!(result.status, DialogTurnStatus::Empty);
    assert!(channel.sent.lock().unwrap().is_empty());
}

/// **Test: A child dialog spans two turns and its result resumes the parent.**
///
/// **Setup:** root begins askName; state saved between turns via MemoryStorage.
/// **Action:** turn 1 begin root; turn 2 continue with "Ann".
/// **Expected:** turn 1 Waiting with stack [root, askName]; turn 2 Complete with result "Ann" and empty stack.
#[tokio::test]
async fn test_child_result_resumes_parent_across_turns() {
    let state = BotState::conversation(Arc::new(MemoryStorage::new()));
    let dialogs = dialog_set(&state);
    let channel = Arc::new(RecordingChannel::default());

    let first = turn("hello", channel.clone());
    let mut dc = dialogs.create_context(&first).await.unwrap();
    let result = dc.begin_dialog("root", None).await.unwrap();
    assert_eq!(result.status, DialogTurnStatus::Waiting);
    let ids: Vec<&str> = dc.stack().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["root", "askName"]);
    state.save_changes(&first, false).await.unwrap();

    let second = turn("Ann", channel.clone());
    let mut dc = dialogs.create_context(&second).await.unwrap();
    assert_eq!(dc.active_dialog().unwrap().id, "askName");
    let result = dc.continue_dialog().await.unwrap();
    assert_eq!(result.status, DialogTurnStatus::Complete);
    assert_eq!(result.result, Some(json!("Ann")));
    assert!(dc.stack().is_empty());

    assert_eq!(
        *channel.sent.lock().unwrap(),
        vec!["What is your name?", "Nice to meet you, Ann."]
    );
}

/// **Test: cancel_all_dialogs clears the stack; a second cancel reports Empty.**
#[tokio::test]
async fn test_cancel_all_dialogs() {
    let state = BotState::conversation(Arc::new(MemoryStorage::new()));
    let dialogs = dialog_set(&state);
    let ctx = turn("hello", Arc::new(RecordingChannel::default()));

    let mut dc = dialogs.create_context(&ctx).await.unwrap();
    dc.begin_dialog("root", None).await.unwrap();

    assert_eq!(
        dc.cancel_all_dialogs().await.unwrap().status,
        DialogTurnStatus::Cancelled
    );
    assert!(dc.active_dialog().is_none());
    assert_eq!(
        dc.cancel_all_dialogs().await.unwrap().status,
        DialogTurnStatus::Empty
    );
}

/// **Test: Beginning an unregistered dialog fails and leaves the stack untouched.**
#[tokio::test]
async fn test_begin_unknown_dialog() {
    let state = BotState::conversation(Arc::new(MemoryStorage::new()));
    let dialogs = dialog_set(&state);
    let ctx = turn("hello", Arc::new(RecordingChannel::default()));

    let mut dc = dialogs.create_context(&ctx).await.unwrap();
    let err = dc.begin_dialog("missing", None).await.unwrap_err();

    assert!(matches!(err, CafebotError::Dialog(_)));
    assert!(dc.stack().is_empty());
}

/// **Test: Registering two dialogs with the same id is rejected.**
#[test]
fn test_duplicate_dialog_id() {
    let state = BotState::conversation(Arc::new(MemoryStorage::new()));
    let mut dialogs = DialogSet::new(state.create_property::<DialogState>("dialogState"));
    dialogs.add(Arc::new(AskNameDialog)).unwrap();

    assert!(matches!(
        dialogs.add(Arc::new(AskNameDialog)),
        Err(DialogError::Duplicate(id)) if id == "askName"
    ));
}
