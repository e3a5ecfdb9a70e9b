//! # PriceBot Quotes
//!
//! File: cli/src/core/quote.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `PriceQuote` is the per-request result of a lookup. It is never cached or
//! persisted. Rendering produces three lines:
//!
//! ```text
//! Bitcoin
//! 1 BTC = 67187.5 USD
//!
//! Last updated: 3 minutes ago
//! ```
//!
//! with bold / code / italic tags when rendered for Telegram.
//!
use crate::core::markup::Markup;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A resolved, live price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    /// Provider identifier the price was fetched for.
    pub id: String,
    /// Display name shown as the heading.
    pub name: String,
    /// Normalized (lowercase) symbol the user asked for.
    pub symbol: String,
    /// Normalized (lowercase) currency code.
    pub currency: String,
    pub value: Decimal,
    /// Provider's last-updated time, seconds since the Unix epoch.
    pub as_of: i64,
}

impl PriceQuote {
    /// `1 BTC = 67187.5 USD`
    pub fn price_line(&self) -> String {
        format!(
            "1 {} = {} {}",
            self.symbol.to_uppercase(),
            self.value.normalize(),
            self.currency.to_uppercase()
        )
    }

    /// Renders the quote relative to `now`.
    pub fn render(&self, markup: Markup, now: DateTime<Utc>) -> String {
        format!(
            "{}\n{}\n\nLast updated: {}",
            markup.bold(&self.name),
            markup.code(&self.price_line()),
            markup.italic(&humanize_since(self.as_of, now))
        )
    }
}

/// # Relative Time (`humanize_since`)
///
/// Describes the distance between `epoch` and `now` in words: `now`,
/// `a second ago`, `12 seconds ago`, `a minute ago`, `3 minutes ago`,
/// `an hour ago`, `5 hours ago`, `a day ago`, `4 days ago`, `a month ago`,
/// `2 months ago`, `a year ago`, `3 years ago`. Timestamps in the future read
/// `... from now`.
pub fn humanize_since(epoch: i64, now: DateTime<Utc>) -> String {
    let delta = now.timestamp() - epoch;
    if delta == 0 {
        return "now".to_string();
    }
    let suffix = if delta > 0 { "ago" } else { "from now" };
    format!("{} {}", describe_seconds(delta.unsigned_abs()), suffix)
}

fn describe_seconds(seconds: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    let plural = |n: u64, one: &str, unit: &str| {
        if n == 1 {
            one.to_string()
        } else {
            format!("{} {}s", n, unit)
        }
    };

    match seconds {
        s if s < MINUTE => plural(s, "a second", "second"),
        s if s < 2 * MINUTE => "a minute".to_string(),
        s if s < HOUR => plural(s / MINUTE, "a minute", "minute"),
        s if s < 2 * HOUR => "an hour".to_string(),
        s if s < DAY => plural(s / HOUR, "an hour", "hour"),
        s => {
            let days = s / DAY;
            let years = days / 365;
            if years > 0 {
                return plural(years, "a year", "year");
            }
            // Months are counted as 30.5 days.
            let months = days * 2 / 61;
            match months {
                0 => plural(days, "a day", "day"),
                m => plural(m, "a month", "month"),
            }
        }
    }
}
