//! # PriceBot Configuration System
//!
//! File: cli/src/core/config.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module implements the configuration system for PriceBot, handling loading,
//! merging, validation, and access to configuration data. Settings are layered so a
//! deployment can pin the cache directory or add curated overrides without touching
//! the defaults baked into the binary.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Command-line flags / environment (`--cache-dir`, `PRICEBOT_CACHE_DIR`)
//! 2. Project-specific `.pricebot.toml` in current directory or ancestors
//! 3. User-specific `<config dir>/pricebot/config.toml`
//! 4. Default values defined in the code
//!
//! Secrets are never read from files. The bot credential and the provider API key
//! come from the process environment only (`Secrets::from_env`), and a missing
//! secret aborts startup with `PriceBotError::StartupConfigMissing`.
//!
//! ## Examples
//!
//! ```toml
//! [provider]
//! timeout_secs = 15
//!
//! [catalog]
//! cache_dir = "~/.cache/pricebot"
//!
//! [overrides.sol]
//! id = "solana"
//! name = "Solana"
//! ```
//!
//! ```rust
//! let cfg = config::load_config(&ConfigOverrides::default())?;
//! let secrets = Secrets::from_env()?;
//! let cache_dir = cfg.cache_dir();
//! ```
//!
use crate::core::error::{PriceBotError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Environment variable holding the Telegram bot credential.
pub const BOT_TOKEN_ENV_VAR: &str = "TELEGRAM_BOT_API_TOKEN";
/// Environment variable holding the CoinGecko API key.
pub const API_KEY_ENV_VAR: &str = "COINGECKO_API_KEY";

const PROJECT_CONFIG_FILENAME: &str = ".pricebot.toml";

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Extra curated symbol overrides, merged over the built-in seed table.
    #[serde(default)]
    pub overrides: BTreeMap<String, OverrideEntry>,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// Settings for the CoinGecko HTTP client.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Base URL of the API, without a trailing slash.
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    /// Header carrying the static API key.
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
    /// Fixed per-request timeout. No retries are made.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Per-request timeout for provider calls.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Where the reference snapshots live.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Directory holding `coins_list.json` and `currencies_list.json` (can use ~).
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

/// Fallbacks for queries that omit a coin or currency.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    #[serde(default = "default_coin")]
    pub coin: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// How many alternative candidates are offered for disambiguation.
    #[serde(default = "default_max_alternatives")]
    pub max_alternatives: usize,
}

/// A single curated override: symbol -> canonical coin.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct OverrideEntry {
    pub id: String,
    pub name: String,
}

/// Settings for the Telegram front-end (`pricebot bot`).
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    #[serde(default = "default_telegram_base_url")]
    pub api_base_url: String,
    /// Long-poll timeout passed to `getUpdates`.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
    /// Published list of coins, linked from `/coins` and the start menu.
    #[serde(default = "default_coin_list_link")]
    pub coin_list_link: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            api_key_header: default_api_key_header(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            coin: default_coin(),
            currency: default_currency(),
            max_alternatives: default_max_alternatives(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_telegram_base_url(),
            poll_timeout_secs: default_poll_timeout_secs(),
            coin_list_link: default_coin_list_link(),
        }
    }
}

fn default_provider_base_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}
fn default_api_key_header() -> String {
    "x-cg-demo-api-key".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_cache_dir() -> String {
    "cache".to_string()
}
fn default_coin() -> String {
    "btc".to_string()
}
fn default_currency() -> String {
    "usd".to_string()
}
fn default_max_alternatives() -> usize {
    3
}
fn default_telegram_base_url() -> String {
    "https://api.telegram.org".to_string()
}
fn default_poll_timeout_secs() -> u64 {
    30
}
fn default_coin_list_link() -> String {
    "https://docs.google.com/spreadsheets/d/1wTTuxXt8n9q7C4NDXqQpI3wpKu1_5bGVmP9Xz0XGSyU/edit?gid=0#gid=0"
        .to_string()
}

impl Config {
    /// The expanded cache directory.
    pub fn cache_dir(&self) -> PathBuf {
        PathBuf::from(&self.catalog.cache_dir)
    }

}

/// Values supplied on the command line that win over every file.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub cache_dir: Option<PathBuf>,
}

/// The two process secrets. `Debug` never prints their values.
#[derive(Clone)]
pub struct Secrets {
    pub bot_token: String,
    pub api_key: String,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("bot_token", &"<redacted>")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Secrets {
    /// # Load Secrets (`from_env`)
    ///
    /// Reads `TELEGRAM_BOT_API_TOKEN` and `COINGECKO_API_KEY` from the process
    /// environment. An unset or blank variable is a fatal startup error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, with the variable lookup injected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |var: &str| -> Result<String> {
            match lookup(var) {
                Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
                _ => Err(anyhow!(PriceBotError::StartupConfigMissing {
                    var: var.to_string()
                })),
            }
        };
        Ok(Self {
            bot_token: require(BOT_TOKEN_ENV_VAR)?,
            api_key: require(API_KEY_ENV_VAR)?,
        })
    }
}

/// # Load Configuration (`load_config`)
///
/// Loads the user and project files, merges them over the defaults, applies the
/// command-line overrides, then expands and validates the result.
pub fn load_config(overrides: &ConfigOverrides) -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config()?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    apply_overrides(&mut merged_config, overrides);
    expand_config_paths(&mut merged_config).context("Failed to expand paths in configuration")?;
    normalize_config(&mut merged_config);
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "PriceBot", "pricebot") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!(
            "No project configuration file (.pricebot.toml) found in current directory or ancestors."
        );
        Ok(None)
    }
}

fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path: &Path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project_cfg = match project {
        Some(p) => p,
        None => return user,
    };
    let defaults = Config::default();
    let pick = |project: String, user: String, default: &str| {
        if project != default {
            project
        } else {
            user
        }
    };

    let mut merged = Config::default();
    merged.provider.base_url = pick(
        project_cfg.provider.base_url,
        user.provider.base_url,
        &defaults.provider.base_url,
    );
    merged.provider.api_key_header = pick(
        project_cfg.provider.api_key_header,
        user.provider.api_key_header,
        &defaults.provider.api_key_header,
    );
    merged.provider.timeout_secs = if project_cfg.provider.timeout_secs != default_timeout_secs() {
        project_cfg.provider.timeout_secs
    } else {
        user.provider.timeout_secs
    };
    merged.catalog.cache_dir = pick(
        project_cfg.catalog.cache_dir,
        user.catalog.cache_dir,
        &defaults.catalog.cache_dir,
    );
    merged.defaults.coin = pick(
        project_cfg.defaults.coin,
        user.defaults.coin,
        &defaults.defaults.coin,
    );
    merged.defaults.currency = pick(
        project_cfg.defaults.currency,
        user.defaults.currency,
        &defaults.defaults.currency,
    );
    merged.defaults.max_alternatives =
        if project_cfg.defaults.max_alternatives != default_max_alternatives() {
            project_cfg.defaults.max_alternatives
        } else {
            user.defaults.max_alternatives
        };
    merged.telegram.api_base_url = pick(
        project_cfg.telegram.api_base_url,
        user.telegram.api_base_url,
        &defaults.telegram.api_base_url,
    );
    merged.telegram.poll_timeout_secs =
        if project_cfg.telegram.poll_timeout_secs != default_poll_timeout_secs() {
            project_cfg.telegram.poll_timeout_secs
        } else {
            user.telegram.poll_timeout_secs
        };
    merged.telegram.coin_list_link = pick(
        project_cfg.telegram.coin_list_link,
        user.telegram.coin_list_link,
        &defaults.telegram.coin_list_link,
    );
    // Override tables are unioned, project entries win per symbol.
    merged.overrides = user.overrides;
    merged.overrides.extend(project_cfg.overrides);
    merged
}

fn apply_overrides(config: &mut Config, overrides: &ConfigOverrides) {
    if let Some(cache_dir) = &overrides.cache_dir {
        debug!("Cache directory overridden on the command line: {}", cache_dir.display());
        config.catalog.cache_dir = cache_dir.to_string_lossy().into_owned();
    }
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    config.catalog.cache_dir = shellexpand::tilde(&config.catalog.cache_dir).into_owned();
    debug!("Expanded cache directory: {}", config.catalog.cache_dir);
    Ok(())
}

fn normalize_config(config: &mut Config) {
    config.defaults.coin = config.defaults.coin.trim().to_lowercase();
    config.defaults.currency = config.defaults.currency.trim().to_lowercase();
    config.provider.base_url = config.provider.base_url.trim_end_matches('/').to_string();
    config.telegram.api_base_url = config.telegram.api_base_url.trim_end_matches('/').to_string();
    config.overrides = std::mem::take(&mut config.overrides)
        .into_iter()
        .map(|(symbol, entry)| (symbol.trim().to_lowercase(), entry))
        .collect();
}

fn validate_config(config: &Config) -> Result<()> {
    for (label, url) in [
        ("provider.base_url", &config.provider.base_url),
        ("telegram.api_base_url", &config.telegram.api_base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow!(PriceBotError::Config(format!(
                "{} must start with http:// or https://, got '{}'.",
                label, url
            ))));
        }
    }
    if config.provider.timeout_secs == 0 {
        return Err(anyhow!(PriceBotError::Config(
            "provider.timeout_secs must be greater than zero.".to_string()
        )));
    }
    if config.provider.api_key_header.trim().is_empty() {
        return Err(anyhow!(PriceBotError::Config(
            "provider.api_key_header cannot be empty.".to_string()
        )));
    }
    if config.catalog.cache_dir.trim().is_empty() {
        return Err(anyhow!(PriceBotError::Config(
            "catalog.cache_dir cannot be empty.".to_string()
        )));
    }
    if config.defaults.coin.is_empty() || config.defaults.currency.is_empty() {
        return Err(anyhow!(PriceBotError::Config(
            "defaults.coin and defaults.currency cannot be empty.".to_string()
        )));
    }
    if config.defaults.max_alternatives == 0 {
        return Err(anyhow!(PriceBotError::Config(
            "defaults.max_alternatives must be at least 1.".to_string()
        )));
    }
    for (symbol, entry) in &config.overrides {
        if symbol.is_empty() || entry.id.trim().is_empty() || entry.name.trim().is_empty() {
            return Err(anyhow!(PriceBotError::Config(format!(
                "Override '{}' must have a non-empty symbol, id and name.",
                symbol
            ))));
        }
    }
    Ok(())
}
