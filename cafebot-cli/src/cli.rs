//! CLI parser and config loading.

use anyhow::Result;
use cafebot::BotConfig;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cafebot")]
#[command(about = "Cafe bot CLI: chat in the terminal or run on Telegram", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Chat with the bot in this terminal (config from env).
    Console,
    /// Run the bot on Telegram (config from env; token can override BOT_TOKEN).
    Telegram {
        #[arg(short, long)]
        token: Option<String>,
    },
}

/// Load BotConfig from environment. If `token` is provided it overrides BOT_TOKEN.
pub fn load_config(token: Option<String>) -> Result<BotConfig> {
    BotConfig::load(token)
}
