//! # cafebot-telegram
//!
//! Telegram transport for the cafe bot: converts teloxide messages into [`cafebot_core::Activity`],
//! sends replies through [`TelegramChannel`], and runs the teloxide REPL over a
//! [`turn_pipeline::TurnPipeline`]. No state, dialog or NLU logic lives here.

mod adapters;
mod channel;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper, TELEGRAM_CHANNEL_ID};
pub use channel::TelegramChannel;
pub use runner::run_repl;
