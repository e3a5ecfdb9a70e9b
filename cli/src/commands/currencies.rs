//! # PriceBot Currencies Command
//!
//! File: cli/src/commands/currencies.rs
//! Author: Christi Mahu
//!
//! `pricebot currencies` prints the supported quote currencies, one per line,
//! in the provider's order.
//!
use crate::core::{app::App, config::ConfigOverrides, error::Result, markup::Markup};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "List the supported quote currencies")]
pub struct CurrenciesArgs {}

pub async fn handle_currencies(_args: CurrenciesArgs, overrides: &ConfigOverrides) -> Result<()> {
    info!("Handling currencies command...");
    let app = App::init(overrides, Markup::Plain).await?;
    let currencies = app.service.catalog().currencies();

    println!("Supported currencies ({}):", currencies.len());
    for code in currencies.codes() {
        println!("{}", code);
    }
    Ok(())
}
