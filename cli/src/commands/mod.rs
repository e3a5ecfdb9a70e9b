//! # PriceBot Command Modules
//!
//! File: cli/src/commands/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module aggregates the top-level commands of the PriceBot CLI. Each
//! command defines its own `clap` arguments struct and an async `handle_*`
//! function, which `main.rs` dispatches to.
//!
//! ## Commands
//!
//! - `price`: one price lookup, printed to the terminal
//! - `choose`: price a disambiguation alternative by its selection token
//! - `currencies`: list the supported quote currencies
//! - `bot`: run the Telegram bot
//!
//! Every handler receives the global `ConfigOverrides` (e.g. `--cache-dir`) and
//! starts the application through `core::app::App::init`.
//!

/// Telegram long-polling front-end (`pricebot bot`).
pub mod bot;
/// `pricebot choose <PAYLOAD>`.
pub mod choose;
/// `pricebot currencies`.
pub mod currencies;
/// `pricebot price [COIN] [CURRENCY]`.
pub mod price;
