//! # PriceBot Price Command
//!
//! File: cli/src/commands/price.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `pricebot price [COIN] [CURRENCY]` answers one price query on the terminal,
//! exactly as the chat bot would answer `/price COIN CURRENCY`.
//!
//! ```bash
//! pricebot price                 # btc in usd
//! pricebot price eth sgd
//! pricebot price btc usd --no-override
//! pricebot price btc usd --id bitcoin-cash --name "Bitcoin Cash"
//! ```
//!
//! Unsupported coins and currencies are printed as ordinary replies and the
//! command still succeeds.
//!
use crate::common::ui::ConsoleSink;
use crate::core::{
    app::App,
    config::ConfigOverrides,
    error::Result,
    markup::Markup,
    service::PriceQuery,
};
use clap::Parser;
use tracing::{debug, info};

/// # Price Command Arguments (`PriceArgs`)
#[derive(Parser, Debug)]
#[command(about = "Show the live price of a coin")]
pub struct PriceArgs {
    /// Coin symbol, e.g. `btc`. Defaults to the configured default coin.
    coin: Option<String>,

    /// Quote currency, e.g. `usd`. Defaults to the configured default currency.
    currency: Option<String>,

    /// Price this provider id instead of resolving the symbol.
    #[arg(long)]
    id: Option<String>,

    /// Display name to use with `--id`.
    #[arg(long, requires = "id")]
    name: Option<String>,

    /// Ignore the curated symbol overrides (pick the provider's first match).
    #[arg(long)]
    no_override: bool,
}

impl PriceArgs {
    fn into_query(self) -> PriceQuery {
        PriceQuery {
            symbol: self.coin,
            explicit_id: self.id,
            display_name: self.name,
            currency: self.currency,
            allow_override: !self.no_override,
        }
    }
}

/// # Handle Price Command (`handle_price`)
pub async fn handle_price(args: PriceArgs, overrides: &ConfigOverrides) -> Result<()> {
    info!("Handling price command...");
    debug!("Price args: {:?}", args);

    let app = App::init(overrides, Markup::Plain).await?;
    app.service.answer(args.into_query(), &ConsoleSink).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_args_defaults() {
        let args = PriceArgs::try_parse_from(["price"]).unwrap();
        assert_eq!(args.into_query(), PriceQuery::default());
    }

    #[test]
    fn test_price_args_full() {
        let args = PriceArgs::try_parse_from([
            "price",
            "btc",
            "sgd",
            "--id",
            "bitcoin-cash",
            "--name",
            "Bitcoin Cash",
            "--no-override",
        ])
        .unwrap();
        let query = args.into_query();
        assert_eq!(query.symbol.as_deref(), Some("btc"));
        assert_eq!(query.currency.as_deref(), Some("sgd"));
        assert_eq!(query.explicit_id.as_deref(), Some("bitcoin-cash"));
        assert_eq!(query.display_name.as_deref(), Some("Bitcoin Cash"));
        assert!(!query.allow_override);
    }

    #[test]
    fn test_name_requires_id() {
        assert!(PriceArgs::try_parse_from(["price", "btc", "--name", "Bitcoin"]).is_err());
    }
}
