//! Component factory: builds storage, state, recognizer and the turn pipeline from config.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use bot_state::{AutoSaveStateMiddleware, BotState, MemoryStorage, SqliteStorage, Storage};
use luis_recognizer::{IntentRecognizer, LuisRecognizer};
use tracing::{error, info, instrument};
use turn_pipeline::{ApologizeOnError, LoggingMiddleware, TurnPipeline};

use crate::bot_file::BotConfiguration;
use crate::config::BotConfig;
use crate::dispatcher::CafeBot;

/// Everything the dispatcher needs besides the channel.
#[derive(Clone)]
pub struct BotComponents {
    pub conversation_state: BotState,
    pub user_state: BotState,
    pub recognizer: Arc<dyn IntentRecognizer>,
}

/// Creates the state storage selected by `STATE_STORE_TYPE`.
#[instrument(skip(config))]
pub async fn create_storage(config: &BotConfig) -> Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match config.state_store_type.as_str() {
        "sqlite" => {
            if let Some(parent) = Path::new(&config.state_sqlite_path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            info!(db_path = %config.state_sqlite_path, "Using SQLite state storage");
            Arc::new(
                SqliteStorage::new(&config.state_sqlite_path)
                    .await
                    .map_err(|e| {
                        error!(error = %e, "Failed to initialize SQLite state storage");
                        anyhow::anyhow!("Failed to initialize SQLite state storage: {}", e)
                    })?,
            )
        }
        _ => {
            info!("Using in-memory state storage");
            Arc::new(MemoryStorage::new())
        }
    };
    Ok(storage)
}

/// Builds the LUIS recognizer from the service entry named by `LUIS_CONFIGURATION`.
#[instrument(skip(config))]
pub fn build_recognizer(config: &BotConfig) -> Result<Arc<dyn IntentRecognizer>> {
    let bot_file = BotConfiguration::load(&config.bot_file)?;
    let service = bot_file.find_luis_service(&config.luis_configuration)?;
    let recognizer = LuisRecognizer::from_service(service).map_err(|e| {
        error!(error = %e, service = %service.name, "Invalid LUIS configuration");
        anyhow::anyhow!("Invalid LUIS configuration '{}': {}", service.name, e)
    })?;
    info!(
        service = %service.name,
        endpoint = %recognizer.application().endpoint,
        "LUIS recognizer configured"
    );
    Ok(Arc::new(recognizer))
}

/// Creates storage, the conversation and user states, and the recognizer.
pub async fn build_bot_components(config: &BotConfig) -> Result<BotComponents> {
    let storage = create_storage(config).await?;
    let recognizer = build_recognizer(config)?;
    Ok(BotComponents {
        conversation_state: BotState::conversation(storage.clone()),
        user_state: BotState::user(storage),
        recognizer,
    })
}

/// Builds the pipeline: logging → auto-save (conversation, user) → [`CafeBot`], apologizing on errors.
pub fn build_pipeline(components: &BotComponents, bot_name: &str) -> Result<TurnPipeline> {
    let bot = CafeBot::new(
        components.conversation_state.clone(),
        components.user_state.clone(),
        components.recognizer.clone(),
        bot_name,
    )?;
    let auto_save = AutoSaveStateMiddleware::new(vec![
        components.conversation_state.clone(),
        components.user_state.clone(),
    ]);

    Ok(TurnPipeline::new(Arc::new(bot))
        .add_middleware(Arc::new(LoggingMiddleware))
        .add_middleware(Arc::new(auto_save))
        .with_on_turn_error(Arc::new(ApologizeOnError)))
}
