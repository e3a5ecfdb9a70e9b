//! # PriceBot Core
//!
//! File: cli/src/core/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The price-lookup domain and the infrastructure it stands on. Front-ends in
//! `commands::` only talk to `app::App` and `service::PriceService`.
//!
//! ## Architecture
//!
//! - `config`: layered TOML configuration and environment secrets
//! - `error`: `PriceBotError` and the crate-wide `Result`
//! - `provider`: the `PriceProvider` seam over the remote price API
//! - `catalog`: symbol table, currency set and their snapshot cache
//! - `resolver`: symbol -> coin resolution and live pricing
//! - `payload`: the `symbol&&id&&currency` disambiguation token
//! - `quote`, `markup`: reply rendering
//! - `service`: defaults, error-to-reply mapping, alternatives, `ChatSink`
//! - `app`: startup wiring
//!
//! ```rust
//! use crate::core::app::App;
//! use crate::core::service::PriceQuery;
//!
//! let app = App::init(&overrides, Markup::Plain).await?;
//! let reply = app.service.handle_query(PriceQuery::default()).await?;
//! ```
//!
pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod markup;
pub mod payload;
pub mod provider;
pub mod quote;
pub mod resolver;
pub mod service;
