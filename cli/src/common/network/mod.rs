//! # PriceBot Network Module (`common::network`)
//!
//! File: cli/src/common/network/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Outbound HTTP integrations. Each submodule wraps one remote API behind a
//! small typed client built on `reqwest`:
//!
//! - **`coingecko`**: the price provider used by the catalog and the resolver.
//!
//! The Telegram Bot API client lives with the `bot` command that drives it.
//!

pub mod coingecko;
