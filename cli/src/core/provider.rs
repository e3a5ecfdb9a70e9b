//! # PriceBot Provider Seam
//!
//! File: cli/src/core/provider.rs
//! Author: Christi Mahu
//!
//! The price provider as seen by the catalog and the resolver. The production
//! implementation is `common::network::coingecko::CoinGeckoClient`; tests plug in
//! in-memory fakes.
//!
use crate::core::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// A spot price and the provider's own timestamp for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotPrice {
    pub value: Decimal,
    /// Seconds since the Unix epoch.
    pub last_updated_at: i64,
}

/// The three provider endpoints PriceBot depends on.
///
/// The list endpoints return the raw response body so the catalog can persist
/// it verbatim as a snapshot. Failures are reported as
/// `PriceBotError::ProviderUnavailable` (or `QuoteMissing` for an empty price).
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Full coin list: `[{"id", "symbol", "name"}, ...]`.
    async fn fetch_coin_list_raw(&self) -> Result<String>;

    /// Supported quote currencies: `["btc", "eth", "usd", ...]`.
    async fn fetch_currency_list_raw(&self) -> Result<String>;

    /// Live price of `id` in `currency`, with the last-updated timestamp.
    async fn fetch_spot_price(&self, id: &str, currency: &str) -> Result<SpotPrice>;
}
