use async_trait::async_trait;
use cafebot_core::{Middleware, Result, TurnContext};
use tracing::{debug, info, instrument};

/// Logs every inbound activity before the handler and the outcome after it.
pub struct LoggingMiddleware;

#[async_trait]
impl Middleware for LoggingMiddleware {
    #[instrument(skip(self, context))]
    async fn before(&self, context: &TurnContext) -> Result<bool> {
        let activity = context.activity();
        info!(
            from_id = %activity.from.id,
            from_name = %activity.from.name,
            activity_type = %activity.activity_type,
            text = %activity.text.as_deref().unwrap_or(""),
            has_value = activity.value.is_some(),
            attachments = activity.attachments.len(),
            "Received activity"
        );
        Ok(true)
    }

    #[instrument(skip(self, context))]
    async fn after(&self, context: &TurnContext) -> Result<()> {
        debug!(
            activity_id = ?context.activity().id,
            responded = context.responded(),
            "Processed activity"
        );
        Ok(())
    }
}
