//! Integration tests for [`turn_pipeline::TurnPipeline`].
//!
//! Covers: middleware before/after order around the handler, middleware before stopping the turn,
//! handler errors skipping after and reaching the error hook, and error propagation without a hook.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cafebot_core::{
    Activity, ActivityHandler, CafebotError, Channel, ChannelAccount, ConversationAccount,
    Middleware, Result, TurnContext,
};
use turn_pipeline::{ApologizeOnError, TurnPipeline, DEFAULT_ERROR_MESSAGE};

fn create_test_activity(text: &str) -> Activity {
    Activity {
        id: Some("test_activity_id".to_string()),
        channel_id: "test".to_string(),
        conversation: ConversationAccount {
            id: "conv-1".to_string(),
            name: None,
        },
        from: ChannelAccount::new("user-1", "Test User"),
        recipient: ChannelAccount::new("bot", "CafeBot"),
        ..Activity::message(text)
    }
}

#[derive(Default)]
struct RecordingChannel {
    sent: Mutex<Vec<Activity>>,
}

#[async_trait]
impl Channel for RecordingChannel {
    async fn send_activity(&self, activity: &Activity) -> Result<()> {
        self.sent.lock().unwrap().push(activity.clone());
        Ok(())
    }
}

struct OrderMiddleware {
    name: String,
    order: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Middleware for OrderMiddleware {
    async fn before(&self, _context: &TurnContext) -> Result<bool> {
        self.order.lock().unwrap().push(format!("before_{}", self.name));
        Ok(true)
    }

    async fn after(&self, _context: &TurnContext) -> Result<()> {
        self.order.lock().unwrap().push(format!("after_{}", self.name));
        Ok(())
    }
}

struct OrderHandler {
    order: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ActivityHandler for OrderHandler {
    async fn on_turn(&self, _context: &TurnContext) -> Result<()> {
        self.order.lock().unwrap().push("handler".to_string());
        Ok(())
    }
}

struct CountingHandler {
    count: Arc<AtomicUsize>,
}

#[async_trait]
impl ActivityHandler for CountingHandler {
    async fn on_turn(&self, _context: &TurnContext) -> Result<()> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingHandler;

#[async_trait]
impl ActivityHandler for FailingHandler {
    async fn on_turn(&self, _context: &TurnContext) -> Result<()> {
        Err(CafebotError::Recognizer("service unavailable".to_string()))
    }
}

/// **Test: Middleware before runs in order, after in reverse, around the handler.**
#[tokio::test]
async fn test_middleware_order_around_handler() {
    let order = Arc::new(Mutex::new(Vec::new()));

    let pipeline = TurnPipeline::new(Arc::new(OrderHandler {
        order: order.clone(),
    }))
    .add_middleware(Arc::new(OrderMiddleware {
        name: "first".to_string(),
        order: order.clone(),
    }))
    .add_middleware(Arc::new(OrderMiddleware {
        name: "second".to_string(),
        order: order.clone(),
    }));

    pipeline
        .process_activity(
            create_test_activity("hi"),
            Arc::new(RecordingChannel::default()),
        )
        .await
        .unwrap();

    let executed = order.lock().unwrap();
    assert_eq!(
        *executed,
        vec![
            "before_first",
            "before_second",
            "handler",
            "after_second",
            "after_first"
        ]
    );
}

/// **Test: Middleware before returning false stops the turn; the handler never runs.**
#[tokio::test]
async fn test_middleware_stops_turn() {
    struct BlockingMiddleware;

    #[async_trait]
    impl Middleware for BlockingMiddleware {
        async fn before(&self, _context: &TurnContext) -> Result<bool> {
            Ok(false)
        }
    }

    let count = Arc::new(AtomicUsize::new(0));
    let pipeline = TurnPipeline::new(Arc::new(CountingHandler {
        count: count.clone(),
    }))
    .add_middleware(Arc::new(BlockingMiddleware));

    pipeline
        .process_activity(
            create_test_activity("hi"),
            Arc::new(RecordingChannel::default()),
        )
        .await
        .unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 0);
}

/// **Test: Handler error skips middleware after and is returned when no hook is set.**
#[tokio::test]
async fn test_handler_error_propagates_without_hook() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let pipeline = TurnPipeline::new(Arc::new(FailingHandler)).add_middleware(Arc::new(
        OrderMiddleware {
            name: "only".to_string(),
            order: order.clone(),
        },
    ));

    let result = pipeline
        .process_activity(
            create_test_activity("hi"),
            Arc::new(RecordingChannel::default()),
        )
        .await;

    assert!(matches!(result, Err(CafebotError::Recognizer(_))));
    assert_eq!(*order.lock().unwrap(), vec!["before_only"]);
}

/// **Test: With ApologizeOnError, a failed turn sends the generic apology and succeeds.**
#[tokio::test]
async fn test_apologize_on_error_sends_generic_reply() {
    let channel = Arc::new(RecordingChannel::default());
    let pipeline =
        TurnPipeline::new(Arc::new(FailingHandler)).with_on_turn_error(Arc::new(ApologizeOnError));

    pipeline
        .process_activity(create_test_activity("hi"), channel.clone())
        .await
        .unwrap();

    let sent = channel.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text.as_deref(), Some(DEFAULT_ERROR_MESSAGE));
    assert_eq!(sent[0].recipient.id, "user-1");
}
