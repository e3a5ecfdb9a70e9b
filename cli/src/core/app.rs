//! # PriceBot Application Wiring
//!
//! File: cli/src/core/app.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `App::init` performs the startup sequence shared by every command that
//! answers price queries:
//!
//! 1. Read the secrets from the environment (fatal if missing).
//! 2. Load the layered configuration.
//! 3. Build the CoinGecko client.
//! 4. Load the reference catalog (from the snapshot cache, or the network on
//!    first run). A provider failure here aborts startup.
//! 5. Seed the override table and merge the configured overrides over it.
//! 6. Build the resolver and the service around them.
//!
//! The catalog is shared read-only from here on.
//!
use crate::common::network::coingecko::CoinGeckoClient;
use crate::core::catalog::{Catalog, CoinCandidate};
use crate::core::config::{self, Config, ConfigOverrides, Secrets};
use crate::core::error::Result;
use crate::core::markup::Markup;
use crate::core::provider::PriceProvider;
use crate::core::resolver::{OverrideTable, PriceResolver};
use crate::core::service::PriceService;
use anyhow::Context;
use std::sync::Arc;
use tracing::{debug, info};

/// Everything a front-end needs after startup.
pub struct App {
    pub config: Config,
    pub secrets: Secrets,
    pub service: PriceService,
}

impl App {
    /// # Initialize Application (`init`)
    ///
    /// Runs the startup sequence. `markup` selects how replies are rendered.
    ///
    /// ## Errors
    ///
    /// * `PriceBotError::StartupConfigMissing` if a secret is unset.
    /// * Configuration, filesystem and provider errors from the catalog load.
    pub async fn init(overrides: &ConfigOverrides, markup: Markup) -> Result<Self> {
        let secrets = Secrets::from_env()?;
        let config =
            config::load_config(overrides).context("Failed to load PriceBot configuration")?;
        debug!("Using cache directory {}", config.cache_dir().display());

        let provider: Arc<dyn PriceProvider> =
            Arc::new(CoinGeckoClient::new(&config.provider, &secrets.api_key)?);
        let catalog = Catalog::load(&config.cache_dir(), provider.as_ref())
            .await
            .context("Failed to load the reference catalog")?;

        let overrides = override_table(&config);
        info!("Resolver ready with {} symbol overrides", overrides.len());
        let resolver = PriceResolver::new(Arc::new(catalog), provider, overrides);
        let service = PriceService::new(Arc::new(resolver), config.defaults.clone(), markup);

        Ok(Self {
            config,
            secrets,
            service,
        })
    }
}

/// Built-in overrides with the configured ones layered on top.
fn override_table(config: &Config) -> OverrideTable {
    OverrideTable::seeded().with_extra(config.overrides.iter().map(|(symbol, entry)| {
        (
            symbol.clone(),
            CoinCandidate::new(entry.id.clone(), entry.name.clone()),
        )
    }))
}
