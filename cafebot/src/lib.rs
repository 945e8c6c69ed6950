//! # Cafe bot application
//!
//! Wires turn-pipeline, bot-state, dialogs and the LUIS recognizer into the cafe bot.
//! [`CafeBot`] is the turn dispatcher; [`run_console`] and [`run_telegram`] host it.

pub mod bot_file;
pub mod cafe_dialogs;
pub mod components;
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod runner;
pub mod turn_properties;
pub mod welcome;

pub use bot_file::{BotConfiguration, ServiceConfig};
pub use cafe_dialogs::{
    BookTableDialog, BookingState, MainDispatcher, UserProfile, BOOK_TABLE_DIALOG,
    MAIN_DISPATCHER_DIALOG,
};
pub use components::{build_bot_components, build_pipeline, build_recognizer, create_storage, BotComponents};
pub use config::BotConfig;
pub use console::{ConsoleChannel, ConsoleSession};
pub use dispatcher::{CafeBot, ATTACHMENTS_MESSAGE, EMPTY_INPUT_MESSAGE};
pub use runner::{run_console, run_telegram};
pub use turn_properties::{
    EntityProperty, TurnProperties, DIALOG_STATE_PROPERTY, ON_TURN_PROPERTY, RECOGNIZED_ENTITIES,
};
pub use welcome::{welcome_user, WELCOME_CARD};
