//! # PriceBot Reference Catalog
//!
//! File: cli/src/core/catalog.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The catalog holds the two lookup tables every query is validated against:
//! - `SymbolTable`: lowercase symbol -> candidate coins, in provider list order
//! - `CurrencySet`: the provider's supported quote currencies
//!
//! Both are materialized exactly once at startup and are read-only afterwards,
//! so the catalog can be shared behind an `Arc` without locking.
//!
//! ## Snapshot Cache
//!
//! Each table is backed by a flat snapshot file in the cache directory:
//! - `coins_list.json`
//! - `currencies_list.json`
//!
//! If the snapshot exists it is parsed and the network is never touched. If it
//! does not, the list is fetched from the provider, the raw body is written to the
//! snapshot verbatim, and the parsed table is returned. Snapshots are never
//! refreshed; delete the files to pick up newly listed coins or currencies.
//!
use crate::common::fs::io;
use crate::core::error::{PriceBotError, Result};
use crate::core::provider::PriceProvider;
use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::Path;
use tracing::{debug, info};

/// Snapshot file holding the provider's raw coin list.
pub const COINS_CACHE_FILE: &str = "coins_list.json";
/// Snapshot file holding the provider's raw supported-currency list.
pub const CURRENCIES_CACHE_FILE: &str = "currencies_list.json";

/// One coin a symbol may refer to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoinCandidate {
    /// Provider-specific canonical identifier, e.g. `bitcoin`.
    pub id: String,
    /// Display name, e.g. `Bitcoin`.
    pub name: String,
}

impl CoinCandidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Row of the provider's `/coins/list` payload.
#[derive(Debug, Deserialize)]
struct CoinListEntry {
    id: String,
    symbol: String,
    name: String,
}

/// Lowercase symbol -> ordered, non-empty candidate list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    entries: HashMap<String, Vec<CoinCandidate>>,
}

impl SymbolTable {
    /// Parses a raw `/coins/list` payload. Duplicate symbols are expected and
    /// simply extend that symbol's candidate list.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        let rows: Vec<CoinListEntry> = serde_json::from_str(raw)?;
        Ok(rows
            .into_iter()
            .map(|row| (row.symbol, CoinCandidate::new(row.id, row.name)))
            .collect())
    }

    /// # Load Symbol Table (`load`)
    ///
    /// Fetch-or-load: parses the snapshot at `cache_path` when present, otherwise
    /// awaits `fetch`, persists the raw body to `cache_path` and parses it.
    pub async fn load<F, Fut>(cache_path: &Path, fetch: F) -> Result<Self>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        load_snapshot(cache_path, "coin list", Self::from_json, fetch).await
    }

    /// Candidates for `symbol`, matched case-insensitively.
    pub fn candidates(&self, symbol: &str) -> Option<&[CoinCandidate]> {
        self.entries
            .get(&normalize(symbol))
            .map(Vec::as_slice)
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl FromIterator<(String, CoinCandidate)> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = (String, CoinCandidate)>>(iter: I) -> Self {
        let mut entries: HashMap<String, Vec<CoinCandidate>> = HashMap::new();
        for (symbol, candidate) in iter {
            entries.entry(normalize(&symbol)).or_default().push(candidate);
        }
        Self { entries }
    }
}

/// Supported quote currencies.
///
/// Codes keep the provider's order and casing for display; membership checks
/// are case-insensitive.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CurrencySet {
    codes: Vec<String>,
    normalized: HashSet<String>,
}

impl CurrencySet {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        let codes: Vec<String> = serde_json::from_str(raw)?;
        Ok(Self::from_codes(codes))
    }

    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes: Vec<String> = codes.into_iter().map(Into::into).collect();
        let normalized = codes.iter().map(|c| normalize(c)).collect();
        Self { codes, normalized }
    }

    /// Same fetch-or-load contract as `SymbolTable::load`.
    pub async fn load<F, Fut>(cache_path: &Path, fetch: F) -> Result<Self>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        load_snapshot(cache_path, "currency list", Self::from_json, fetch).await
    }

    pub fn contains(&self, code: &str) -> bool {
        self.normalized.contains(&normalize(code))
    }

    /// Codes in provider order, as the provider spelled them.
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }
}

/// The combined, read-only reference data.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    symbols: SymbolTable,
    currencies: CurrencySet,
}

impl Catalog {
    pub fn new(symbols: SymbolTable, currencies: CurrencySet) -> Self {
        Self {
            symbols,
            currencies,
        }
    }

    /// # Load Catalog (`load`)
    ///
    /// Materializes both tables from `cache_dir`, falling back to the provider
    /// for any snapshot that does not exist yet. A provider failure here is fatal
    /// for the caller: there is no partial catalog.
    pub async fn load(cache_dir: &Path, provider: &dyn PriceProvider) -> Result<Self> {
        io::ensure_dir_exists(cache_dir)?;

        let symbols = SymbolTable::load(&cache_dir.join(COINS_CACHE_FILE), || {
            provider.fetch_coin_list_raw()
        })
        .await?;
        let currencies = CurrencySet::load(&cache_dir.join(CURRENCIES_CACHE_FILE), || {
            provider.fetch_currency_list_raw()
        })
        .await?;

        info!(
            "Catalog ready: {} symbols, {} currencies",
            symbols.len(),
            currencies.len()
        );
        Ok(Self::new(symbols, currencies))
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn currencies(&self) -> &CurrencySet {
        &self.currencies
    }
}

/// Lowercases a user- or provider-supplied symbol or currency code.
pub fn normalize(code: &str) -> String {
    code.trim().to_lowercase()
}

async fn load_snapshot<T, P, F, Fut>(
    cache_path: &Path,
    label: &str,
    parse: P,
    fetch: F,
) -> Result<T>
where
    P: Fn(&str) -> serde_json::Result<T>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<String>>,
{
    if cache_path.is_file() {
        info!("Loading {} from cache: {}", label, cache_path.display());
        let raw = io::read_file_to_string(cache_path)?;
        return parse(&raw).map_err(|e| {
            anyhow!(PriceBotError::CacheCorrupted {
                path: cache_path.display().to_string(),
                reason: e.to_string(),
            })
        });
    }

    info!("Requesting {} from the price provider", label);
    let raw = fetch()
        .await
        .with_context(|| format!("Failed to fetch the {}", label))?;
    let parsed = parse(&raw).map_err(|e| {
        anyhow!(PriceBotError::ProviderUnavailable(format!(
            "unexpected {} payload: {}",
            label, e
        )))
    })?;
    io::write_string_to_file(cache_path, &raw)?;
    debug!("Saved {} snapshot to {}", label, cache_path.display());
    Ok(parsed)
}
