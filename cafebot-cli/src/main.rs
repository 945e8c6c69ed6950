//! cafebot CLI: chat in the terminal or run on Telegram. Config from env (and `.env`) plus CLI args.

use anyhow::Result;
use cafebot::{run_console, run_telegram};
use cafebot_cli::{load_config, Cli, Commands};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Console => run_console(load_config(None)?).await,
        Commands::Telegram { token } => run_telegram(load_config(token)?).await,
    }
}
