//! REPL runner: converts teloxide messages to activities and runs each through the TurnPipeline.

use std::sync::Arc;

use anyhow::Result;
use cafebot_core::{Channel, ChannelAccount};
use teloxide::prelude::*;
use tracing::{error, info, instrument};
use turn_pipeline::TurnPipeline;

use crate::adapters::TelegramMessageWrapper;
use crate::channel::TelegramChannel;

/// Starts the REPL. Each message becomes one turn, awaited inside the handler so turns of the same
/// chat stay in order (teloxide dispatches per chat sequentially).
#[instrument(skip(bot, pipeline, bot_account))]
pub async fn run_repl(
    bot: teloxide::Bot,
    pipeline: TurnPipeline,
    bot_account: ChannelAccount,
) -> Result<()> {
    let channel: Arc<dyn Channel> = Arc::new(TelegramChannel::new(bot.clone()));

    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let pipeline = pipeline.clone();
        let channel = channel.clone();
        let bot_account = bot_account.clone();

        async move {
            let activity = TelegramMessageWrapper(&msg).to_activity(&bot_account);
            info!(
                user_id = %activity.from.id,
                chat_id = %activity.conversation.id,
                activity_type = %activity.activity_type,
                "Received message"
            );

            if let Err(e) = pipeline.process_activity(activity, channel).await {
                error!(error = %e, chat_id = msg.chat.id.0, "Turn failed");
            }
            respond(())
        }
    })
    .await;

    Ok(())
}
