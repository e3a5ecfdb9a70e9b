//! # PriceBot CLI Entry Point
//!
//! File: cli/src/main.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! PriceBot answers "what is this coin worth in that currency" from live
//! CoinGecko data, either on the terminal or as a Telegram bot. This file parses
//! the command line, sets up logging, and dispatches to the command handlers.
//!
//! ## Architecture
//!
//! - `commands`: one module per subcommand (`price`, `choose`, `currencies`, `bot`)
//! - `common`: filesystem, HTTP and console helpers
//! - `core`: configuration, errors, the catalog, the resolver and the service
//!
//! ## Examples
//!
//! ```bash
//! pricebot price eth sgd
//! pricebot choose 'btc&&bitcoin-cash&&usd' --label 'Bitcoin Cash'
//! pricebot --cache-dir ~/.cache/pricebot currencies
//! pricebot bot -vv
//! ```
//!
//! Log verbosity follows `-v` (info), `-vv` (debug), `-vvv` (trace), unless
//! `RUST_LOG` is set. Logs go to stderr.
//!
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod common;
mod core;

use crate::core::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(
    name = "pricebot",
    about = "Realtime CoinGecko price lookups for the terminal and Telegram",
    long_about = "Look up live cryptocurrency prices by symbol, pick between coins that share\n\
                  a symbol, and serve the same lookups as a Telegram bot.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding the coin and currency snapshots.
    #[arg(long, env = "PRICEBOT_CACHE_DIR", global = true)]
    cache_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
enum Commands {
    #[command(alias = "p")]
    Price(commands::price::PriceArgs),
    Choose(commands::choose::ChooseArgs),
    Currencies(commands::currencies::CurrenciesArgs),
    Bot(commands::bot::BotArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let overrides = ConfigOverrides {
        cache_dir: cli.cache_dir,
    };
    let command_result = match cli.command {
        Commands::Price(args) => commands::price::handle_price(args, &overrides).await,
        Commands::Choose(args) => commands::choose::handle_choose(args, &overrides).await,
        Commands::Currencies(args) => {
            commands::currencies::handle_currencies(args, &overrides).await
        }
        Commands::Bot(args) => commands::bot::handle_bot(args, &overrides).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_cmd::Command;
    use predicates::prelude::*;

    fn pricebot_cmd() -> Command {
        Command::cargo_bin("pricebot").expect("Failed to find pricebot binary for testing")
    }

    #[test]
    fn test_main_help_flag() {
        pricebot_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("price"))
            .stdout(predicate::str::contains("bot"));
    }

    #[test]
    fn test_main_version_flag() {
        pricebot_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
}
