//! # PriceBot Choose Command
//!
//! File: cli/src/commands/choose.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `pricebot choose <PAYLOAD>` is the console version of tapping one of the
//! "other coins with the same symbol" buttons. `PAYLOAD` is the
//! `symbol&&id&&currency` token printed by `pricebot price`; the curated
//! overrides are bypassed so the chosen coin is the one priced.
//!
//! ```bash
//! pricebot choose 'btc&&bitcoin-cash&&usd' --label 'Bitcoin Cash'
//! ```
//!
use crate::common::ui::ConsoleSink;
use crate::core::{
    app::App,
    config::ConfigOverrides,
    error::Result,
    markup::Markup,
    payload::ChoicePayload,
    service::ChatSink,
};
use clap::Parser;
use tracing::{debug, info};

/// # Choose Command Arguments (`ChooseArgs`)
#[derive(Parser, Debug)]
#[command(about = "Price one of the alternatives offered for an ambiguous symbol")]
pub struct ChooseArgs {
    /// Selection token in the form `symbol&&id&&currency`.
    payload: String,

    /// Display name of the chosen coin (the alternative's label).
    #[arg(long)]
    label: Option<String>,
}

/// # Handle Choose Command (`handle_choose`)
///
/// The token is decoded before any startup work, so a malformed token fails
/// fast without touching the cache or the network.
pub async fn handle_choose(args: ChooseArgs, overrides: &ConfigOverrides) -> Result<()> {
    info!("Handling choose command...");
    debug!("Choose args: {:?}", args);

    let payload: ChoicePayload = args.payload.parse()?;
    let app = App::init(overrides, Markup::Plain).await?;
    let reply = app.service.handle_choice(payload, args.label).await?;
    ConsoleSink.deliver(&reply).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_args_parsing() {
        let args = ChooseArgs::try_parse_from([
            "choose",
            "btc&&bitcoin-cash&&usd",
            "--label",
            "Bitcoin Cash",
        ])
        .unwrap();
        assert_eq!(args.payload, "btc&&bitcoin-cash&&usd");
        assert_eq!(args.label.as_deref(), Some("Bitcoin Cash"));

        assert!(ChooseArgs::try_parse_from(["choose"]).is_err());
    }
}
