//! # cafebot-cli
//!
//! Argument parsing and config loading for the `cafebot` binary.

pub mod cli;

pub use cafebot::BotConfig;
pub use cli::{load_config, Cli, Commands};
