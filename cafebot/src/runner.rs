use std::sync::Arc;

use anyhow::Result;
use cafebot_core::{init_file_tracing, init_tracing, Channel, ChannelAccount};
use cafebot_telegram::run_repl;
use teloxide::prelude::*;
use tracing::{error, info, instrument};

use crate::components::{build_bot_components, build_pipeline};
use crate::config::BotConfig;
use crate::console::{ConsoleChannel, ConsoleSession};

/// Runs the bot in the terminal: stdin lines in, replies on stdout. Logs go to the log file only.
#[instrument(skip(config))]
pub async fn run_console(config: BotConfig) -> Result<()> {
    init_file_tracing(&config.log_file)?;

    info!(
        bot_file = %config.bot_file,
        state_store_type = %config.state_store_type,
        "Initializing console bot"
    );
    let components = build_bot_components(&config).await?;
    let pipeline = build_pipeline(&components, &config.bot_name)?;

    let channel: Arc<dyn Channel> = Arc::new(ConsoleChannel::stdout());
    let session = ConsoleSession::new(&config.bot_name);
    println!("Talking to {}. Type 'quit' or press Ctrl-D to leave.", config.bot_name);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    session.run(&pipeline, channel, stdin).await?;
    Ok(())
}

/// Runs the bot on Telegram. The bot's Telegram first name replaces `BOT_NAME`.
#[instrument(skip(config))]
pub async fn run_telegram(config: BotConfig) -> Result<()> {
    init_tracing(&config.log_file)?;

    let bot = {
        let bot = Bot::new(config.require_bot_token()?.to_string());
        if let Some(ref url_str) = config.telegram_api_url {
            match reqwest::Url::parse(url_str) {
                Ok(url) => bot.set_api_url(url),
                Err(e) => {
                    error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                    bot
                }
            }
        } else {
            bot
        }
    };

    let me = bot.get_me().await?;
    let bot_account = ChannelAccount::new(me.user.id.0.to_string(), me.user.first_name.clone());
    info!(
        bot_id = %bot_account.id,
        bot_name = %bot_account.name,
        state_store_type = %config.state_store_type,
        "Initializing Telegram bot"
    );

    let components = build_bot_components(&config).await?;
    let pipeline = build_pipeline(&components, &bot_account.name)?;

    info!("Bot started successfully");
    run_repl(bot, pipeline, bot_account).await
}
