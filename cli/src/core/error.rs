//! # PriceBot Error Types
//!
//! File: cli/src/core/error.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module defines the error types used throughout PriceBot. Domain
//! failures are variants of `PriceBotError`; everything else travels as
//! `anyhow::Error` with context attached at each layer.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `PriceBotError`: A custom error enum using `thiserror` for specific error types
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible error handling
//!
//! The variants fall into three groups:
//! - User-recoverable lookup failures (`UnsupportedCoin`, `UnsupportedCurrency`),
//!   rendered back to the chat as plain messages
//! - `MalformedPayload`, raised when a selection token does not decode; the
//!   console rejects it, the bot logs and ignores it
//! - Provider failures (`ProviderUnavailable`, `QuoteMissing`), fatal during the
//!   catalog load and reported per query afterwards
//! - Startup failures (`StartupConfigMissing`, `Config`, `CacheCorrupted`,
//!   `FileSystem`), which abort the process
//!
//! ## Examples
//!
//! ```rust
//! // Return a specific error type
//! if !catalog.currencies().contains(&currency) {
//!     return Err(PriceBotError::UnsupportedCurrency { currency }.into());
//! }
//!
//! // Recover a domain error at the boundary
//! match resolver.select(&request) {
//!     Ok(selection) => price_and_render(selection).await,
//!     Err(e) => match e.downcast_ref::<PriceBotError>() {
//!         Some(err) if err.is_user_facing() => reply_with(err),
//!         _ => return Err(e),
//!     },
//! }
//! ```
//!
use thiserror::Error;

/// Custom error type for the PriceBot application.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceBotError {
    #[error("Unsupported coin '{symbol}'")]
    UnsupportedCoin { symbol: String },

    #[error("Unsupported currency '{currency}'")]
    UnsupportedCurrency { currency: String },

    #[error("Price provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Provider returned no price for '{id}' in '{currency}'")]
    QuoteMissing { id: String, currency: String },

    #[error("Required environment variable '{var}' is not set")]
    StartupConfigMissing { var: String },

    #[error("Malformed selection payload '{token}': {reason}")]
    MalformedPayload { token: String, reason: String },

    #[error("Cache file '{path}' is corrupted: {reason}")]
    CacheCorrupted { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),
}

impl PriceBotError {
    /// Whether this error is an expected, user-recoverable lookup condition
    /// that should be answered in the chat instead of failing the handler.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedCoin { .. } | Self::UnsupportedCurrency { .. }
        )
    }

    /// Whether this error came from the price provider during a query.
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_) | Self::QuoteMissing { .. })
    }
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let coin = PriceBotError::UnsupportedCoin {
            symbol: "zzz".into(),
        };
        assert_eq!(coin.to_string(), "Unsupported coin 'zzz'");

        let missing = PriceBotError::StartupConfigMissing {
            var: "COINGECKO_API_KEY".into(),
        };
        assert_eq!(
            missing.to_string(),
            "Required environment variable 'COINGECKO_API_KEY' is not set"
        );

        let payload = PriceBotError::MalformedPayload {
            token: "btc&&usd".into(),
            reason: "expected 3 fields, found 2".into(),
        };
        assert_eq!(
            payload.to_string(),
            "Malformed selection payload 'btc&&usd': expected 3 fields, found 2"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(PriceBotError::UnsupportedCurrency {
            currency: "zzz".into()
        }
        .is_user_facing());
        assert!(!PriceBotError::ProviderUnavailable("timeout".into()).is_user_facing());
        assert!(PriceBotError::QuoteMissing {
            id: "bitcoin".into(),
            currency: "usd".into()
        }
        .is_provider_failure());
        assert!(!PriceBotError::Config("bad".into()).is_provider_failure());
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = PriceBotError::UnsupportedCoin {
            symbol: "abc".into(),
        }
        .into();
        let err = err.context("Failed to resolve price");
        assert!(matches!(
            err.downcast_ref::<PriceBotError>(),
            Some(PriceBotError::UnsupportedCoin { symbol }) if symbol == "abc"
        ));
    }
}
