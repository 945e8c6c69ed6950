use anyhow::Result;
use std::env;

/// Cafe bot configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Path of the bot configuration file (JSON) holding the LUIS service entries.
    pub bot_file: String,
    /// Display name of the bot; joined members with this name are not welcomed.
    pub bot_name: String,
    /// Name of the `luis` service entry in the bot file.
    pub luis_configuration: String,
    /// `memory` | `sqlite`.
    pub state_store_type: String,
    pub state_sqlite_path: String,
    pub log_file: String,
    /// Only required by the Telegram runner.
    pub bot_token: Option<String>,
    /// Optional Telegram Bot API base URL (e.g. a mock server in tests).
    /// Env: `TELEGRAM_API_URL` or `TELOXIDE_API_URL`.
    pub telegram_api_url: Option<String>,
}

impl BotConfig {
    /// Loads config from the environment. A given `token` overrides `BOT_TOKEN`.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_file = env::var("BOT_FILE").unwrap_or_else(|_| "./cafebot.bot".to_string());
        let bot_name = env::var("BOT_NAME").unwrap_or_else(|_| "CafeBot".to_string());
        let luis_configuration =
            env::var("LUIS_CONFIGURATION").unwrap_or_else(|_| "cafeDispatchModel".to_string());
        let state_store_type =
            env::var("STATE_STORE_TYPE").unwrap_or_else(|_| "memory".to_string());
        let state_sqlite_path =
            env::var("STATE_SQLITE_PATH").unwrap_or_else(|_| "./data/state.db".to_string());
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/cafebot.log".to_string());
        let bot_token = token
            .or_else(|| env::var("BOT_TOKEN").ok())
            .filter(|t| !t.trim().is_empty());
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();

        if luis_configuration.trim().is_empty() {
            anyhow::bail!("LUIS_CONFIGURATION must name a luis service in the bot file");
        }

        Ok(Self {
            bot_file,
            bot_name,
            luis_configuration,
            state_store_type,
            state_sqlite_path,
            log_file,
            bot_token,
            telegram_api_url,
        })
    }

    /// The Telegram token, or an error telling how to provide it.
    pub fn require_bot_token(&self) -> Result<&str> {
        self.bot_token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("BOT_TOKEN not set (use --token or the BOT_TOKEN env var)"))
    }
}
