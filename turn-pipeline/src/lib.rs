//! # Turn pipeline
//!
//! Runs a sequence of middleware (before/after) around the bot's [`ActivityHandler`] for each inbound
//! activity. Middleware can stop the turn; after callbacks run in reverse order and only when the
//! handler succeeded. A failed turn goes to the [`OnTurnError`] hook when one is configured.

mod logging;

pub use logging::LoggingMiddleware;

use async_trait::async_trait;
use cafebot_core::{Activity, ActivityHandler, CafebotError, Channel, Middleware, Result, TurnContext};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Reply sent by [`ApologizeOnError`] when a turn fails.
pub const DEFAULT_ERROR_MESSAGE: &str = "Sorry, it looks like something went wrong.";

/// Called with the failed turn's context and error. Returning an error makes `process_activity` fail.
#[async_trait]
pub trait OnTurnError: Send + Sync {
    async fn on_turn_error(&self, context: &TurnContext, error: &CafebotError) -> Result<()>;
}

/// Logs the failure and tells the user something went wrong.
pub struct ApologizeOnError;

#[async_trait]
impl OnTurnError for ApologizeOnError {
    async fn on_turn_error(&self, context: &TurnContext, error: &CafebotError) -> Result<()> {
        error!(
            error = %error,
            conversation_id = %context.activity().conversation.id,
            "Unhandled error during turn"
        );
        context.send_text(DEFAULT_ERROR_MESSAGE).await
    }
}

/// Middleware in order (before), then the handler; middleware after in reverse order.
#[derive(Clone)]
pub struct TurnPipeline {
    middleware: Vec<Arc<dyn Middleware>>,
    handler: Arc<dyn ActivityHandler>,
    on_turn_error: Option<Arc<dyn OnTurnError>>,
}

impl TurnPipeline {
    /// Creates a pipeline around `handler` with no middleware and no error hook.
    pub fn new(handler: Arc<dyn ActivityHandler>) -> Self {
        Self {
            middleware: Vec::new(),
            handler,
            on_turn_error: None,
        }
    }

    /// Appends a middleware (before runs in order, after in reverse).
    pub fn add_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Sets the hook that handles a failed turn instead of returning the error.
    pub fn with_on_turn_error(mut self, hook: Arc<dyn OnTurnError>) -> Self {
        self.on_turn_error = Some(hook);
        self
    }

    /// Creates the turn context for `activity` and runs the turn. Errors go to the hook when set.
    #[instrument(skip(self, activity, channel), fields(activity_type = %activity.activity_type))]
    pub async fn process_activity(
        &self,
        activity: Activity,
        channel: Arc<dyn Channel>,
    ) -> Result<()> {
        let context = TurnContext::new(activity, channel);
        match self.run(&context).await {
            Ok(()) => Ok(()),
            Err(e) => match &self.on_turn_error {
                Some(hook) => hook.on_turn_error(&context, &e).await,
                None => Err(e),
            },
        }
    }

    /// Runs middleware before, then the handler, then middleware after in reverse.
    pub async fn run(&self, context: &TurnContext) -> Result<()> {
        let activity = context.activity();
        info!(
            conversation_id = %activity.conversation.id,
            from_id = %activity.from.id,
            activity_type = %activity.activity_type,
            "step: turn started"
        );

        for mw in &self.middleware {
            let mw_name = std::any::type_name_of_val(mw.as_ref());
            let should_continue = mw.before(context).await?;
            if !should_continue {
                info!(
                    conversation_id = %activity.conversation.id,
                    middleware = %mw_name,
                    "step: middleware before returned false, turn stopped"
                );
                return Ok(());
            }
        }

        let handler_name = std::any::type_name_of_val(self.handler.as_ref());
        info!(handler = %handler_name, "step: handler processing");
        self.handler.on_turn(context).await?;
        info!(
            handler = %handler_name,
            responded = context.responded(),
            "step: handler done"
        );

        for mw in self.middleware.iter().rev() {
            let mw_name = std::any::type_name_of_val(mw.as_ref());
            mw.after(context).await?;
            info!(middleware = %mw_name, "step: middleware after done");
        }

        info!(
            conversation_id = %activity.conversation.id,
            "step: turn finished"
        );
        Ok(())
    }
}

// Integration tests live in tests/turn_pipeline_test.rs
