//! # PriceBot Price Service
//!
//! File: cli/src/core/service.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `PriceService` is the boundary between front-ends (console, Telegram) and
//! the resolver. It fills in default coin and currency, turns expected lookup
//! failures into reply text, and builds the disambiguation offer:
//!
//! ```text
//! Bitcoin
//! 1 BTC = 67187 USD
//!
//! Last updated: 3 minutes ago
//!
//! Check other coins with the same symbol BTC
//!   [Bitcoin Cash]          -> btc&&bitcoin-cash&&usd
//!   [Some Other BTC Coin]   -> btc&&some-other-btc-coin&&usd
//! ```
//!
//! Only unexpected failures (anything that is not an unsupported coin or
//! currency, or a per-query provider failure) are returned as errors.
//!
//! Replies are handed to a `ChatSink`, which each front-end implements.
//!
use crate::core::catalog::Catalog;
use crate::core::config::DefaultsConfig;
use crate::core::error::{PriceBotError, Result};
use crate::core::markup::Markup;
use crate::core::payload::ChoicePayload;
use crate::core::resolver::{LookupRequest, PriceResolver, Resolution};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

/// A price request as it arrives from a front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuery {
    /// Coin symbol; the configured default coin when absent.
    pub symbol: Option<String>,
    pub explicit_id: Option<String>,
    pub display_name: Option<String>,
    /// Quote currency; the configured default currency when absent.
    pub currency: Option<String>,
    pub allow_override: bool,
}

impl Default for PriceQuery {
    fn default() -> Self {
        Self {
            symbol: None,
            explicit_id: None,
            display_name: None,
            currency: None,
            allow_override: true,
        }
    }
}

impl PriceQuery {
    pub fn new(symbol: Option<String>, currency: Option<String>) -> Self {
        Self {
            symbol,
            currency,
            ..Self::default()
        }
    }
}

/// One selectable alternative coin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    /// Button label: the coin's display name.
    pub label: String,
    pub payload: ChoicePayload,
}

/// What a front-end should show for one request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    pub text: String,
    /// Heading for `alternatives`; present iff there are alternatives.
    pub prompt: Option<String>,
    pub alternatives: Vec<Alternative>,
}

impl Reply {
    /// A text-only reply.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Delivers replies to wherever the request came from.
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn deliver(&self, reply: &Reply) -> Result<()>;
}

/// # Price Service (`PriceService`)
///
/// Stateless apart from its configuration; every method may be called
/// concurrently.
pub struct PriceService {
    resolver: Arc<PriceResolver>,
    defaults: DefaultsConfig,
    markup: Markup,
    /// Longest selection token the front-end can carry, in bytes.
    max_payload_len: Option<usize>,
}

impl PriceService {
    pub fn new(resolver: Arc<PriceResolver>, defaults: DefaultsConfig, markup: Markup) -> Self {
        Self {
            resolver,
            defaults,
            markup,
            max_payload_len: None,
        }
    }

    /// Alternatives whose encoded token is longer than `max_len` bytes are left
    /// out before the list is capped.
    pub fn with_max_payload_len(mut self, max_len: usize) -> Self {
        self.max_payload_len = Some(max_len);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        self.resolver.catalog()
    }

    /// # Handle Query (`handle_query`)
    ///
    /// Resolves `query` and renders the reply. Unsupported coins and
    /// currencies come back as reply text, as does a provider outage once the
    /// coin is known.
    pub async fn handle_query(&self, query: PriceQuery) -> Result<Reply> {
        let symbol = non_blank(query.symbol).unwrap_or_else(|| self.defaults.coin.clone());
        let currency =
            non_blank(query.currency).unwrap_or_else(|| self.defaults.currency.clone());

        let mut request =
            LookupRequest::new(symbol, currency).with_override(query.allow_override);
        if let Some(id) = non_blank(query.explicit_id) {
            request = request.with_explicit(id, non_blank(query.display_name));
        }

        let selection = match self.resolver.select(&request) {
            Ok(selection) => selection,
            Err(e) => return self.recover(e),
        };
        let shown_name = selection.coin.name.clone();
        let symbol = selection.symbol.clone();

        match self.resolver.price(selection).await {
            Ok(resolution) => Ok(self.render(resolution)),
            Err(e) => match e.downcast_ref::<PriceBotError>() {
                Some(err) if err.is_provider_failure() => {
                    warn!("Price lookup for '{}' failed: {:#}", symbol, e);
                    Ok(Reply::message(format!(
                        "Price for {} is temporarily unavailable. Please try again later.",
                        self.markup.bold(&shown_name)
                    )))
                }
                _ => Err(e),
            },
        }
    }

    /// Re-enters resolution for a coin the user picked from the alternatives.
    /// Overrides are bypassed.
    pub async fn handle_choice(
        &self,
        payload: ChoicePayload,
        label: Option<String>,
    ) -> Result<Reply> {
        self.handle_query(PriceQuery {
            symbol: Some(payload.symbol),
            explicit_id: Some(payload.id),
            display_name: label,
            currency: Some(payload.currency),
            allow_override: false,
        })
        .await
    }

    /// # Handle Disambiguation Choice (`handle_disambiguation_choice`)
    ///
    /// Decodes a `symbol&&id&&currency` token, then behaves like
    /// `handle_choice`. A token that does not decode is
    /// `PriceBotError::MalformedPayload`.
    pub async fn handle_disambiguation_choice(
        &self,
        token: &str,
        label: Option<String>,
    ) -> Result<Reply> {
        let payload: ChoicePayload = token.parse()?;
        self.handle_choice(payload, label).await
    }

    /// Handles `query` and delivers the reply through `sink`.
    pub async fn answer(&self, query: PriceQuery, sink: &dyn ChatSink) -> Result<()> {
        let reply = self.handle_query(query).await?;
        sink.deliver(&reply).await
    }

    fn render(&self, resolution: Resolution) -> Reply {
        let Resolution { quote, others } = resolution;
        let alternatives: Vec<Alternative> = others
            .into_iter()
            .map(|coin| Alternative {
                label: coin.name,
                payload: ChoicePayload::new(&quote.symbol, coin.id, &quote.currency),
            })
            .filter(|alternative| self.fits_payload(alternative))
            .take(self.defaults.max_alternatives)
            .collect();
        let prompt = (!alternatives.is_empty()).then(|| {
            format!(
                "Check other coins with the same symbol {}",
                self.markup.bold(&quote.symbol.to_uppercase())
            )
        });

        Reply {
            text: quote.render(self.markup, Utc::now()),
            prompt,
            alternatives,
        }
    }

    fn fits_payload(&self, alternative: &Alternative) -> bool {
        let Some(max_len) = self.max_payload_len else {
            return true;
        };
        let len = alternative.payload.encode().len();
        if len > max_len {
            warn!(
                "Skipping alternative '{}': selection token is {} bytes",
                alternative.label, len
            );
        }
        len <= max_len
    }

    fn recover(&self, e: anyhow::Error) -> Result<Reply> {
        let Some(err) = e
            .downcast_ref::<PriceBotError>()
            .filter(|err| err.is_user_facing())
        else {
            return Err(e);
        };
        let text = match err {
            PriceBotError::UnsupportedCoin { symbol } => {
                format!("Unsupported coin {}", self.markup.code(symbol))
            }
            PriceBotError::UnsupportedCurrency { currency } => {
                format!("Unsupported currency {}", self.markup.code(currency))
            }
            other => other.to_string(),
        };
        Ok(Reply::message(text))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolver::tests::{sample_catalog, MockProvider};
    use crate::core::catalog::{CoinCandidate, CurrencySet, SymbolTable};
    use crate::core::resolver::OverrideTable;
    use std::sync::Mutex;

    fn defaults(max_alternatives: usize) -> DefaultsConfig {
        DefaultsConfig {
            coin: "btc".into(),
            currency: "usd".into(),
            max_alternatives,
        }
    }

    fn service(provider: Arc<MockProvider>, markup: Markup) -> PriceService {
        let resolver = PriceResolver::new(sample_catalog(), provider, OverrideTable::seeded());
        PriceService::new(Arc::new(resolver), defaults(3), markup)
    }

    fn priced() -> Arc<MockProvider> {
        Arc::new(
            MockProvider::default()
                .with_price("bitcoin", "usd", "67187", Utc::now().timestamp())
                .with_price("some-other-btc-coin", "usd", "0.02", Utc::now().timestamp()),
        )
    }

    #[derive(Default)]
    struct RecordingSink {
        replies: Mutex<Vec<Reply>>,
    }

    #[async_trait]
    impl ChatSink for RecordingSink {
        async fn deliver(&self, reply: &Reply) -> Result<()> {
            self.replies.lock().unwrap().push(reply.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_defaults_to_btc_in_usd_with_alternatives() {
        let reply = service(priced(), Markup::Html)
            .handle_query(PriceQuery::default())
            .await
            .unwrap();

        assert!(reply.text.starts_with("<b>Bitcoin</b>\n<code>1 BTC = 67187 USD</code>"));
        assert_eq!(
            reply.prompt.as_deref(),
            Some("Check other coins with the same symbol <b>BTC</b>")
        );
        let tokens: Vec<String> = reply.alternatives.iter().map(|a| a.payload.encode()).collect();
        assert_eq!(
            tokens,
            vec!["btc&&bitcoin-cash&&usd", "btc&&some-other-btc-coin&&usd"]
        );
        assert_eq!(reply.alternatives[0].label, "Bitcoin Cash");
    }

    #[tokio::test]
    async fn test_alternatives_are_capped() {
        let resolver = PriceResolver::new(sample_catalog(), priced(), OverrideTable::seeded());
        let svc = PriceService::new(Arc::new(resolver), defaults(1), Markup::Plain);
        let reply = svc
            .handle_query(PriceQuery::new(Some("btc".into()), None))
            .await
            .unwrap();
        assert_eq!(reply.alternatives.len(), 1);
    }

    #[tokio::test]
    async fn test_oversized_tokens_do_not_use_up_the_cap() {
        let long_id = "wrapped-bitcoin-bridged-from-a-sidechain-with-a-long-name";
        let symbols: SymbolTable = [
            ("bitcoin", "Bitcoin"),
            (long_id, "Wrapped Bitcoin"),
            ("bitcoin-cash", "Bitcoin Cash"),
        ]
        .into_iter()
        .map(|(id, name)| ("btc".to_string(), CoinCandidate::new(id, name)))
        .collect();
        let catalog = Catalog::new(symbols, CurrencySet::from_codes(["usd"]));
        let resolver = PriceResolver::new(Arc::new(catalog), priced(), OverrideTable::seeded());
        let svc = PriceService::new(Arc::new(resolver), defaults(1), Markup::Plain)
            .with_max_payload_len(64);

        let reply = svc.handle_query(PriceQuery::default()).await.unwrap();
        assert_eq!(reply.alternatives.len(), 1);
        assert_eq!(reply.alternatives[0].label, "Bitcoin Cash");
        assert!(reply.prompt.is_some());
    }

    #[tokio::test]
    async fn test_single_candidate_has_no_alternatives() {
        let provider = Arc::new(
            MockProvider::default().with_price("ethereum", "usd", "3400.5", Utc::now().timestamp()),
        );
        let sink = RecordingSink::default();
        service(provider, Markup::Html)
            .answer(PriceQuery::new(Some("eth".into()), None), &sink)
            .await
            .unwrap();

        let replies = sink.replies.lock().unwrap();
        assert_eq!(replies.len(), 1);
        assert!(replies[0]
            .text
            .starts_with("<b>Ethereum</b>\n<code>1 ETH = 3400.5 USD</code>"));
        assert!(replies[0].alternatives.is_empty());
        assert!(replies[0].prompt.is_none());
    }

    #[tokio::test]
    async fn test_unsupported_inputs_render_as_text() {
        let svc = service(priced(), Markup::Html);

        let coin = svc
            .handle_query(PriceQuery::new(Some("zzz".into()), Some("usd".into())))
            .await
            .unwrap();
        assert_eq!(coin, Reply::message("Unsupported coin <code>zzz</code>"));

        let currency = svc
            .handle_query(PriceQuery::new(Some("btc".into()), Some("ZZZ".into())))
            .await
            .unwrap();
        assert_eq!(currency.text, "Unsupported currency <code>zzz</code>");
        assert!(currency.alternatives.is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_is_reported_per_query() {
        let provider = Arc::new(MockProvider::default());
        let reply = service(provider.clone(), Markup::Plain)
            .handle_query(PriceQuery::new(Some("eth".into()), Some("sgd".into())))
            .await
            .unwrap();
        assert_eq!(
            reply.text,
            "Price for Ethereum is temporarily unavailable. Please try again later."
        );
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_choice_round_trip_bypasses_override() {
        let provider = priced();
        let svc = service(provider.clone(), Markup::Plain);

        let reply = svc
            .handle_disambiguation_choice(
                "btc&&some-other-btc-coin&&usd",
                Some("Some Other BTC Coin".into()),
            )
            .await
            .unwrap();

        assert!(reply.text.starts_with("Some Other BTC Coin\n1 BTC = 0.02 USD"));
        let labels: Vec<&str> = reply.alternatives.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["Bitcoin", "Bitcoin Cash"]);
        assert_eq!(
            provider.calls(),
            vec![("some-other-btc-coin".to_string(), "usd".to_string())]
        );
    }

    #[tokio::test]
    async fn test_malformed_choice_is_an_error() {
        let err = service(priced(), Markup::Plain)
            .handle_disambiguation_choice("btc&&usd", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PriceBotError>(),
            Some(PriceBotError::MalformedPayload { .. })
        ));
    }

    #[tokio::test]
    async fn test_answer_delivers_through_sink() {
        let sink = RecordingSink::default();
        service(priced(), Markup::Plain)
            .answer(PriceQuery::new(Some("abc".into()), Some("vnd".into())), &sink)
            .await
            .unwrap();

        let replies = sink.replies.lock().unwrap();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.starts_with("Price for First ABC"));
    }
}
