//! # PriceBot Price Resolver
//!
//! File: cli/src/core/resolver.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Turns a user query `(symbol, currency)` into a live `PriceQuote` plus the
//! other coins that share the symbol. Each call is stateless: it reads the
//! shared `Catalog` and makes at most one provider request.
//!
//! ## Resolution Order
//!
//! 1. The symbol is normalized and must exist in the symbol table
//!    (`UnsupportedCoin` otherwise).
//! 2. One candidate is picked by running the strategy chain in order, first hit
//!    wins:
//!    - `ExplicitSelection`: the caller named an id (disambiguation follow-up)
//!    - `OverrideLookup`: a hand-picked mapping for popular symbols such as
//!      `btc`, skipped when `allow_override` is false
//!    - `FirstCandidate`: the first coin in provider list order
//! 3. The currency must be in the currency set (`UnsupportedCurrency`
//!    otherwise). This happens before any network call.
//! 4. The spot price is fetched.
//! 5. Candidates whose *name* differs from the resolved name are returned as
//!    alternatives, in provider order.
//!
//! Steps 1 to 3 are `PriceResolver::select`, steps 4 and 5 are
//! `PriceResolver::price`. Keeping them apart lets a caller still name the coin
//! when the price fetch fails.
//!
//! ## Examples
//!
//! ```rust
//! let resolver = PriceResolver::new(catalog, provider, OverrideTable::seeded());
//! let selection = resolver.select(&LookupRequest::new("btc", "usd"))?;
//! let resolution = resolver.price(selection).await?;
//! println!("{}", resolution.quote.price_line());
//! ```
//!
use crate::core::catalog::{normalize, Catalog, CoinCandidate};
use crate::core::error::{PriceBotError, Result};
use crate::core::provider::PriceProvider;
use crate::core::quote::PriceQuote;
use anyhow::anyhow;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Input of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub symbol: String,
    /// Provider id chosen by the user, bypassing automatic selection.
    pub explicit_id: Option<String>,
    /// Display name to pair with `explicit_id`.
    pub display_name: Option<String>,
    pub currency: String,
    pub allow_override: bool,
}

impl LookupRequest {
    /// A plain `symbol in currency` lookup with overrides enabled.
    pub fn new(symbol: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            explicit_id: None,
            display_name: None,
            currency: currency.into(),
            allow_override: true,
        }
    }

    /// Pins the lookup to `id`, optionally with its display name.
    pub fn with_explicit(mut self, id: impl Into<String>, name: Option<String>) -> Self {
        self.explicit_id = Some(id.into());
        self.display_name = name;
        self
    }

    pub fn with_override(mut self, allow_override: bool) -> Self {
        self.allow_override = allow_override;
        self
    }
}

/// Hand-curated symbol -> coin mappings that win over provider order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideTable {
    entries: HashMap<String, CoinCandidate>,
}

impl OverrideTable {
    /// The built-in table: `btc` -> Bitcoin, `eth` -> Ethereum.
    pub fn seeded() -> Self {
        Self::default()
            .with_extra([
                ("btc".to_string(), CoinCandidate::new("bitcoin", "Bitcoin")),
                ("eth".to_string(), CoinCandidate::new("ethereum", "Ethereum")),
            ])
    }

    /// Adds (or replaces) mappings. Keys are normalized.
    pub fn with_extra<I>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (String, CoinCandidate)>,
    {
        for (symbol, candidate) in extra {
            self.entries.insert(normalize(&symbol), candidate);
        }
        self
    }

    pub fn get(&self, symbol: &str) -> Option<&CoinCandidate> {
        self.entries.get(&normalize(symbol))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// One step of the identifier-resolution chain.
pub trait ResolutionStrategy: Send + Sync {
    /// Short name used in debug logs.
    fn name(&self) -> &'static str;

    /// Picks a coin for `request`, or passes by returning `None`.
    /// `candidates` is never empty.
    fn resolve(&self, request: &LookupRequest, candidates: &[CoinCandidate])
        -> Option<CoinCandidate>;
}

/// Honors an id the user picked explicitly.
#[derive(Debug, Default)]
pub struct ExplicitSelection;

impl ResolutionStrategy for ExplicitSelection {
    fn name(&self) -> &'static str {
        "explicit"
    }

    fn resolve(
        &self,
        request: &LookupRequest,
        candidates: &[CoinCandidate],
    ) -> Option<CoinCandidate> {
        let id = request.explicit_id.as_deref()?;
        let name = request
            .display_name
            .clone()
            .or_else(|| {
                candidates
                    .iter()
                    .find(|c| c.id == id)
                    .map(|c| c.name.clone())
            })
            .unwrap_or_else(|| id.to_string());
        Some(CoinCandidate::new(id, name))
    }
}

/// Applies the `OverrideTable` when overrides are allowed.
#[derive(Debug)]
pub struct OverrideLookup {
    table: OverrideTable,
}

impl OverrideLookup {
    pub fn new(table: OverrideTable) -> Self {
        Self { table }
    }
}

impl ResolutionStrategy for OverrideLookup {
    fn name(&self) -> &'static str {
        "override"
    }

    fn resolve(&self, request: &LookupRequest, _: &[CoinCandidate]) -> Option<CoinCandidate> {
        if !request.allow_override {
            return None;
        }
        self.table.get(&request.symbol).cloned()
    }
}

/// Falls back to the first coin the provider lists for the symbol.
#[derive(Debug, Default)]
pub struct FirstCandidate;

impl ResolutionStrategy for FirstCandidate {
    fn name(&self) -> &'static str {
        "first-candidate"
    }

    fn resolve(&self, _: &LookupRequest, candidates: &[CoinCandidate]) -> Option<CoinCandidate> {
        candidates.first().cloned()
    }
}

/// Outcome of steps 1 to 3: a validated coin and currency, ready to price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub symbol: String,
    pub coin: CoinCandidate,
    pub currency: String,
    /// Candidates whose name differs from `coin.name`, in provider order.
    pub others: Vec<CoinCandidate>,
}

/// A priced selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub quote: PriceQuote,
    pub others: Vec<CoinCandidate>,
}

/// # Price Resolver (`PriceResolver`)
///
/// Owns a handle to the read-only catalog, the provider, and the strategy
/// chain. Cheap to share behind an `Arc`.
pub struct PriceResolver {
    catalog: Arc<Catalog>,
    provider: Arc<dyn PriceProvider>,
    strategies: Vec<Box<dyn ResolutionStrategy>>,
}

impl PriceResolver {
    /// Builds a resolver with the standard chain:
    /// explicit selection, then `overrides`, then first candidate.
    pub fn new(
        catalog: Arc<Catalog>,
        provider: Arc<dyn PriceProvider>,
        overrides: OverrideTable,
    ) -> Self {
        Self::with_strategies(
            catalog,
            provider,
            vec![
                Box::new(ExplicitSelection),
                Box::new(OverrideLookup::new(overrides)),
                Box::new(FirstCandidate),
            ],
        )
    }

    pub fn with_strategies(
        catalog: Arc<Catalog>,
        provider: Arc<dyn PriceProvider>,
        strategies: Vec<Box<dyn ResolutionStrategy>>,
    ) -> Self {
        Self {
            catalog,
            provider,
            strategies,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// # Select Coin (`select`)
    ///
    /// Validates the symbol, picks the coin and validates the currency. Makes
    /// no network calls.
    ///
    /// ## Errors
    ///
    /// * `PriceBotError::UnsupportedCoin` with the normalized symbol.
    /// * `PriceBotError::UnsupportedCurrency` with the normalized currency.
    pub fn select(&self, request: &LookupRequest) -> Result<Selection> {
        let symbol = normalize(&request.symbol);
        let candidates = self
            .catalog
            .symbols()
            .candidates(&symbol)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                anyhow!(PriceBotError::UnsupportedCoin {
                    symbol: symbol.clone()
                })
            })?;

        let normalized = LookupRequest {
            symbol: symbol.clone(),
            ..request.clone()
        };
        let coin = self
            .strategies
            .iter()
            .find_map(|strategy| {
                strategy.resolve(&normalized, candidates).inspect(|coin| {
                    debug!(
                        "Resolved '{}' to '{}' via {}",
                        symbol,
                        coin.id,
                        strategy.name()
                    )
                })
            })
            .unwrap_or_else(|| candidates[0].clone());

        let currency = normalize(&request.currency);
        if !self.catalog.currencies().contains(&currency) {
            return Err(anyhow!(PriceBotError::UnsupportedCurrency { currency }));
        }

        let others = candidates
            .iter()
            .filter(|c| c.name != coin.name)
            .cloned()
            .collect();

        Ok(Selection {
            symbol,
            coin,
            currency,
            others,
        })
    }

    /// Fetches the live price for an already validated selection.
    pub async fn price(&self, selection: Selection) -> Result<Resolution> {
        let spot = self
            .provider
            .fetch_spot_price(&selection.coin.id, &selection.currency)
            .await?;
        Ok(Resolution {
            quote: PriceQuote {
                id: selection.coin.id,
                name: selection.coin.name,
                symbol: selection.symbol,
                currency: selection.currency,
                value: spot.value,
                as_of: spot.last_updated_at,
            },
            others: selection.others,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::catalog::{CurrencySet, SymbolTable};
    use crate::core::provider::SpotPrice;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::Mutex;

    /// In-memory provider recording every price request.
    #[derive(Default)]
    pub(crate) struct MockProvider {
        pub prices: HashMap<(String, String), SpotPrice>,
        pub calls: Mutex<Vec<(String, String)>>,
    }

    impl MockProvider {
        pub fn with_price(mut self, id: &str, currency: &str, value: &str, at: i64) -> Self {
            self.prices.insert(
                (id.to_string(), currency.to_string()),
                SpotPrice {
                    value: Decimal::from_str(value).unwrap(),
                    last_updated_at: at,
                },
            );
            self
        }

        pub fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PriceProvider for MockProvider {
        async fn fetch_coin_list_raw(&self) -> Result<String> {
            Ok("[]".into())
        }

        async fn fetch_currency_list_raw(&self) -> Result<String> {
            Ok("[]".into())
        }

        async fn fetch_spot_price(&self, id: &str, currency: &str) -> Result<SpotPrice> {
            let key = (id.to_string(), currency.to_string());
            self.calls.lock().unwrap().push(key.clone());
            self.prices.get(&key).cloned().ok_or_else(|| {
                anyhow!(PriceBotError::QuoteMissing {
                    id: id.to_string(),
                    currency: currency.to_string(),
                })
            })
        }
    }

    /// btc -> [Bitcoin, Bitcoin Cash, Some Other BTC Coin]; abc -> [first, second];
    /// currencies usd, sgd, vnd.
    pub(crate) fn sample_catalog() -> Arc<Catalog> {
        let symbols: SymbolTable = [
            ("btc", "bitcoin", "Bitcoin"),
            ("btc", "bitcoin-cash", "Bitcoin Cash"),
            ("btc", "some-other-btc-coin", "Some Other BTC Coin"),
            ("abc", "first", "First ABC"),
            ("abc", "second", "Second ABC"),
            ("eth", "ethereum", "Ethereum"),
        ]
        .into_iter()
        .map(|(sym, id, name)| (sym.to_string(), CoinCandidate::new(id, name)))
        .collect();
        let currencies = CurrencySet::from_codes(["usd", "sgd", "vnd"]);
        Arc::new(Catalog::new(symbols, currencies))
    }

    fn resolver(provider: Arc<MockProvider>) -> PriceResolver {
        PriceResolver::new(sample_catalog(), provider, OverrideTable::seeded())
    }

    async fn resolve(resolver: &PriceResolver, request: &LookupRequest) -> Result<Resolution> {
        let selection = resolver.select(request)?;
        resolver.price(selection).await
    }

    #[tokio::test]
    async fn test_btc_usd_uses_override_and_lists_others() {
        let provider = Arc::new(MockProvider::default().with_price("bitcoin", "usd", "67187", 100));
        let resolution = resolve(&resolver(provider.clone()), &LookupRequest::new("BTC", "USD"))
            .await
            .unwrap();

        assert_eq!(resolution.quote.id, "bitcoin");
        assert_eq!(resolution.quote.name, "Bitcoin");
        assert_eq!(resolution.quote.price_line(), "1 BTC = 67187 USD");
        assert_eq!(
            resolution.others,
            vec![
                CoinCandidate::new("bitcoin-cash", "Bitcoin Cash"),
                CoinCandidate::new("some-other-btc-coin", "Some Other BTC Coin"),
            ]
        );
        assert_eq!(provider.calls(), vec![("bitcoin".into(), "usd".into())]);
    }

    #[tokio::test]
    async fn test_unsupported_currency_makes_no_price_call() {
        let provider = Arc::new(MockProvider::default());
        let err = resolve(&resolver(provider.clone()), &LookupRequest::new("btc", "ZZZ"))
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<PriceBotError>(),
            Some(&PriceBotError::UnsupportedCurrency {
                currency: "zzz".into()
            })
        );
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_checked_before_currency() {
        let provider = Arc::new(MockProvider::default());
        let err = resolve(&resolver(provider.clone()), &LookupRequest::new("Nope", "zzz"))
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<PriceBotError>(),
            Some(&PriceBotError::UnsupportedCoin {
                symbol: "nope".into()
            })
        );
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_first_candidate_without_override() {
        let provider = Arc::new(MockProvider::default().with_price("first", "sgd", "1.5", 1));
        let resolution = resolve(&resolver(provider), &LookupRequest::new("abc", "sgd"))
            .await
            .unwrap();

        assert_eq!(resolution.quote.name, "First ABC");
        assert_eq!(
            resolution.others,
            vec![CoinCandidate::new("second", "Second ABC")]
        );
    }

    #[test]
    fn test_override_disabled_falls_back_to_provider_order() {
        let r = resolver(Arc::new(MockProvider::default()));
        let catalog_first = r
            .select(&LookupRequest::new("btc", "usd").with_override(false))
            .unwrap();
        assert_eq!(catalog_first.coin, CoinCandidate::new("bitcoin", "Bitcoin"));

        let custom = PriceResolver::new(
            sample_catalog(),
            Arc::new(MockProvider::default()),
            OverrideTable::default().with_extra([(
                "BTC".to_string(),
                CoinCandidate::new("bitcoin-cash", "Bitcoin Cash"),
            )]),
        );
        let overridden = custom.select(&LookupRequest::new("btc", "usd")).unwrap();
        assert_eq!(overridden.coin.id, "bitcoin-cash");
        let plain = custom
            .select(&LookupRequest::new("btc", "usd").with_override(false))
            .unwrap();
        assert_eq!(plain.coin.id, "bitcoin");
    }

    #[test]
    fn test_explicit_selection_beats_override() {
        let r = resolver(Arc::new(MockProvider::default()));
        let request = LookupRequest::new("btc", "usd")
            .with_explicit("some-other-btc-coin", Some("Some Other BTC Coin".into()));
        let selection = r.select(&request).unwrap();

        assert_eq!(selection.coin.id, "some-other-btc-coin");
        assert_eq!(
            selection.others,
            vec![
                CoinCandidate::new("bitcoin", "Bitcoin"),
                CoinCandidate::new("bitcoin-cash", "Bitcoin Cash"),
            ]
        );
    }

    #[test]
    fn test_explicit_selection_recovers_missing_name() {
        let r = resolver(Arc::new(MockProvider::default()));
        let known = r
            .select(&LookupRequest::new("btc", "usd").with_explicit("bitcoin-cash", None))
            .unwrap();
        assert_eq!(known.coin.name, "Bitcoin Cash");

        let unknown = r
            .select(&LookupRequest::new("btc", "usd").with_explicit("wrapped-btc", None))
            .unwrap();
        assert_eq!(unknown.coin, CoinCandidate::new("wrapped-btc", "wrapped-btc"));
    }

    #[test]
    fn test_others_exclude_by_name_not_id() {
        let symbols: SymbolTable = [
            ("dup", "dup-one", "Duplicate"),
            ("dup", "dup-two", "Duplicate"),
            ("dup", "dup-three", "Different"),
        ]
        .into_iter()
        .map(|(sym, id, name)| (sym.to_string(), CoinCandidate::new(id, name)))
        .collect();
        let catalog = Arc::new(Catalog::new(symbols, CurrencySet::from_codes(["usd"])));
        let r = PriceResolver::new(
            catalog,
            Arc::new(MockProvider::default()),
            OverrideTable::default(),
        );

        let selection = r.select(&LookupRequest::new("dup", "usd")).unwrap();
        assert_eq!(selection.coin.id, "dup-one");
        assert_eq!(
            selection.others,
            vec![CoinCandidate::new("dup-three", "Different")]
        );
    }

    #[tokio::test]
    async fn test_missing_quote_is_provider_failure() {
        let r = resolver(Arc::new(MockProvider::default()));
        let err = resolve(&r, &LookupRequest::new("eth", "vnd"))
            .await
            .unwrap_err();
        let domain = err.downcast_ref::<PriceBotError>().unwrap();
        assert!(domain.is_provider_failure());
    }
}
