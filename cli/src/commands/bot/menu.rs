//! # Bot Menus
//!
//! File: cli/src/commands/bot/menu.rs
//! Author: Christi Mahu
//!
//! Static texts and keyboards of the Telegram front-end: the `/start` usage
//! menu, the `/coins` link and the `/currencies` listing. All text is Telegram
//! HTML.
//!
use super::telegram::{InlineKeyboardButton, InlineKeyboardMarkup};
use crate::core::config::{DefaultsConfig, TelegramConfig};
use crate::core::markup::Markup;

const HTML: Markup = Markup::Html;

/// Usage text shown by `/start`.
pub fn start_text(defaults: &DefaultsConfig) -> String {
    [
        HTML.bold("Hi! This is the Realtime CoinGecko Price Bot."),
        String::new(),
        HTML.bold("Usage:"),
        "Check coin price in a currency".to_string(),
        "/p | /price [coin] [currency]".to_string(),
        format!("Example: '/p' or '{}'", HTML.code("/price btc vnd")),
        String::new(),
        "Check Bitcoin or Ethereum price in a currency".to_string(),
        "/btc | /eth [currency]".to_string(),
        format!("Example: '/btc' or '/eth' or '{}'", HTML.code("/eth sgd")),
        String::new(),
        "Supported coins".to_string(),
        "/coins".to_string(),
        format!("Default: {}", HTML.code(&defaults.coin)),
        String::new(),
        "Supported currencies".to_string(),
        "/currencies".to_string(),
        format!("Default: {}", HTML.code(&defaults.currency)),
    ]
    .join("\n")
}

/// Buttons under the `/start` menu.
pub fn start_keyboard(
    defaults: &DefaultsConfig,
    telegram: &TelegramConfig,
) -> InlineKeyboardMarkup {
    let currency = defaults.currency.to_uppercase();
    InlineKeyboardMarkup::column(vec![
        InlineKeyboardButton::callback(format!("BTC Price in {}", currency), "btc"),
        InlineKeyboardButton::callback(format!("ETH Price in {}", currency), "eth"),
        InlineKeyboardButton::link("List of supported coins", &telegram.coin_list_link),
        InlineKeyboardButton::callback("List of supported currencies", "currencies"),
    ])
}

/// Reply to `/coins`.
pub fn coins_text(coin_list_link: &str) -> String {
    format!("Please refer to {}", HTML.link("this link", coin_list_link))
}

/// Reply to `/currencies`.
pub fn currencies_text(codes: &[String]) -> String {
    let listed: Vec<String> = codes.iter().map(|code| HTML.code(code)).collect();
    format!("Supported currencies\n\n{}", listed.join(", "))
}
