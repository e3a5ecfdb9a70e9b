//! # PriceBot CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Every test runs
//! the compiled `pricebot` binary inside its own temporary directory, with a
//! pre-seeded snapshot cache so that no test ever reaches the network.
//!

// Allow potentially unused code in this common module, as different test files
// might use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const COINS_SNAPSHOT: &str = r#"[
    {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin"},
    {"id": "bitcoin-cash", "symbol": "btc", "name": "Bitcoin Cash"},
    {"id": "ethereum", "symbol": "eth", "name": "Ethereum"}
]"#;

pub const CURRENCIES_SNAPSHOT: &str = r#"["usd", "sgd", "vnd"]"#;

/// # Get PriceBot Command (`pricebot_cmd`)
///
/// A command for the compiled `pricebot` binary.
pub fn pricebot_cmd() -> Command {
    Command::cargo_bin("pricebot").expect("Failed to find pricebot binary for testing")
}

/// # Sandboxed Command (`sandboxed_cmd`)
///
/// A `pricebot` command running in `workdir`, with dummy secrets set and the
/// user configuration directory pointed inside `workdir` so the developer's
/// own config never leaks into a test.
pub fn sandboxed_cmd(workdir: &Path) -> Command {
    let mut cmd = pricebot_cmd();
    cmd.current_dir(workdir)
        .env("HOME", workdir)
        .env("XDG_CONFIG_HOME", workdir.join(".config"))
        .env("TELEGRAM_BOT_API_TOKEN", "test-token")
        .env("COINGECKO_API_KEY", "test-key")
        .env_remove("PRICEBOT_CACHE_DIR")
        .env_remove("RUST_LOG");
    cmd
}

/// Writes both snapshots into `dir`, creating it if needed.
pub fn seed_cache(dir: &Path) {
    fs::create_dir_all(dir).expect("Failed to create cache directory");
    fs::write(dir.join("coins_list.json"), COINS_SNAPSHOT).expect("Failed to seed coin list");
    fs::write(dir.join("currencies_list.json"), CURRENCIES_SNAPSHOT)
        .expect("Failed to seed currency list");
}

/// A temporary working directory with a `.git` marker (stopping the project
/// config search) and a seeded `cache/` directory.
pub fn seeded_workdir() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::create_dir(dir.path().join(".git")).expect("Failed to create .git marker");
    seed_cache(&dir.path().join("cache"));
    dir
}
