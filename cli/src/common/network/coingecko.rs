//! # CoinGecko Client
//!
//! File: cli/src/common/network/coingecko.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `CoinGeckoClient` implements `PriceProvider` against the public CoinGecko
//! REST API. Three endpoints are used:
//!
//! | Endpoint                                   | Purpose                         |
//! |--------------------------------------------|---------------------------------|
//! | `GET /coins/list`                          | full coin list (catalog)        |
//! | `GET /simple/supported_vs_currencies`      | quote currencies (catalog)      |
//! | `GET /simple/price?ids=&vs_currencies=...` | live price per query            |
//!
//! The static API key travels in a default header (`x-cg-demo-api-key` unless
//! configured otherwise). Every request shares one fixed timeout and is never
//! retried. Transport errors, timeouts and non-2xx statuses all surface as
//! `PriceBotError::ProviderUnavailable`.
//!
use crate::core::config::ProviderConfig;
use crate::core::error::{PriceBotError, Result};
use crate::core::provider::{PriceProvider, SpotPrice};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

/// HTTP client for the CoinGecko v3 API.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
}

impl CoinGeckoClient {
    /// # Create Client (`new`)
    ///
    /// Builds the underlying `reqwest::Client` with the configured timeout and
    /// the API key header attached to every request.
    ///
    /// ## Errors
    ///
    /// `PriceBotError::Config` if the header name or key is not a valid HTTP
    /// header, or if the client cannot be built.
    pub fn new(config: &ProviderConfig, api_key: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(config.api_key_header.as_bytes()).map_err(|e| {
            anyhow!(PriceBotError::Config(format!(
                "invalid API key header '{}': {}",
                config.api_key_header, e
            )))
        })?;
        let mut key_value = HeaderValue::from_str(api_key).map_err(|_| {
            anyhow!(PriceBotError::Config(
                "API key contains characters not allowed in an HTTP header".to_string()
            ))
        })?;
        key_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(header_name, key_value);

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| {
                anyhow!(PriceBotError::Config(format!(
                    "failed to create HTTP client: {}",
                    e
                )))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| unavailable(path, e))?;
        let response = response
            .error_for_status()
            .map_err(|e| unavailable(path, e))?;
        response.text().await.map_err(|e| unavailable(path, e))
    }
}

fn unavailable(path: &str, err: reqwest::Error) -> anyhow::Error {
    let reason = if err.is_timeout() {
        format!("{} timed out", path)
    } else {
        format!("{}: {}", path, err)
    };
    anyhow!(PriceBotError::ProviderUnavailable(reason))
}

#[async_trait]
impl PriceProvider for CoinGeckoClient {
    async fn fetch_coin_list_raw(&self) -> Result<String> {
        self.get_text("/coins/list", &[]).await
    }

    async fn fetch_currency_list_raw(&self) -> Result<String> {
        self.get_text("/simple/supported_vs_currencies", &[]).await
    }

    async fn fetch_spot_price(&self, id: &str, currency: &str) -> Result<SpotPrice> {
        let raw = self
            .get_text(
                "/simple/price",
                &[
                    ("ids", id),
                    ("vs_currencies", currency),
                    ("include_last_updated_at", "true"),
                ],
            )
            .await?;
        parse_spot_price(&raw, id, currency)
            .with_context(|| format!("Failed to read the price of '{}' in '{}'", id, currency))
    }
}

/// # Parse Spot Price (`parse_spot_price`)
///
/// Reads `{"<id>": {"<currency>": <number>, "last_updated_at": <epoch>}}`.
/// With serde_json's `arbitrary_precision` the number keeps its JSON text, which
/// is parsed straight into `Decimal`.
///
/// ## Errors
///
/// * `PriceBotError::ProviderUnavailable` if the body is not JSON, or the price
///   needs more than the 28 decimal places `Decimal` can hold.
/// * `PriceBotError::QuoteMissing` if the id, the currency or the
///   `last_updated_at` timestamp is absent.
pub fn parse_spot_price(raw: &str, id: &str, currency: &str) -> Result<SpotPrice> {
    let body: Value = serde_json::from_str(raw).map_err(|e| {
        anyhow!(PriceBotError::ProviderUnavailable(format!(
            "unexpected price payload: {}",
            e
        )))
    })?;
    let missing = || {
        anyhow!(PriceBotError::QuoteMissing {
            id: id.to_string(),
            currency: currency.to_string(),
        })
    };

    let entry = body.get(id).ok_or_else(missing)?;
    let number = entry
        .get(currency)
        .and_then(Value::as_number)
        .ok_or_else(missing)?;
    let text = number.to_string();
    let value = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| {
            anyhow!(PriceBotError::ProviderUnavailable(format!(
                "price '{}' is not a decimal: {}",
                text, e
            )))
        })?;
    let last_updated_at = entry
        .get("last_updated_at")
        .and_then(Value::as_i64)
        .ok_or_else(missing)?;

    Ok(SpotPrice {
        value,
        last_updated_at,
    })
}
