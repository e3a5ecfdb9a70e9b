//! # PriceBot Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared helpers that are not part of the price-lookup domain itself:
//!
//! - **`fs`**: file I/O backing the catalog snapshot cache.
//! - **`network`**: HTTP clients for remote APIs (CoinGecko).
//! - **`ui`**: terminal rendering of replies for the console commands.
//!
//! Domain logic lives in `core::`; command wiring lives in `commands::`.
//!

/// Filesystem helpers (directory creation, snapshot read/write).
pub mod fs;
/// Remote API clients.
pub mod network;
/// Console output of replies.
pub mod ui;
