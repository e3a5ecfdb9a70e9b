//! # PriceBot Disambiguation Payload
//!
//! File: cli/src/core/payload.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! When a symbol maps to several coins, each alternative is offered as a
//! selectable action. The action carries a `ChoicePayload` encoded as
//! `symbol&&id&&currency`, which is what the chat platform echoes back when the
//! user picks it. Decoding validates the field count and rejects anything else
//! with `PriceBotError::MalformedPayload`.
//!
//! ```rust
//! let payload = ChoicePayload::new("btc", "bitcoin-cash", "usd");
//! assert_eq!(payload.encode(), "btc&&bitcoin-cash&&usd");
//! let decoded: ChoicePayload = "btc&&bitcoin-cash&&usd".parse()?;
//! ```
//!
use crate::core::error::PriceBotError;
use std::fmt;
use std::str::FromStr;

/// Field separator of the encoded token.
pub const PAYLOAD_SEPARATOR: &str = "&&";

const FIELD_COUNT: usize = 3;

/// An explicit coin choice: `(symbol, id, currency)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoicePayload {
    pub symbol: String,
    pub id: String,
    pub currency: String,
}

impl ChoicePayload {
    pub fn new(
        symbol: impl Into<String>,
        id: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            id: id.into(),
            currency: currency.into(),
        }
    }

    /// `symbol&&id&&currency`
    pub fn encode(&self) -> String {
        [self.symbol.as_str(), self.id.as_str(), self.currency.as_str()].join(PAYLOAD_SEPARATOR)
    }

    /// Whether raw action data looks like an encoded choice rather than a plain
    /// menu action such as `btc` or `currencies`.
    pub fn is_encoded(data: &str) -> bool {
        data.contains(PAYLOAD_SEPARATOR)
    }
}

impl fmt::Display for ChoicePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for ChoicePayload {
    type Err = PriceBotError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: String| PriceBotError::MalformedPayload {
            token: token.to_string(),
            reason,
        };

        let fields: Vec<&str> = token.split(PAYLOAD_SEPARATOR).map(str::trim).collect();
        if fields.len() != FIELD_COUNT {
            return Err(malformed(format!(
                "expected {} fields, found {}",
                FIELD_COUNT,
                fields.len()
            )));
        }
        if let Some(position) = fields.iter().position(|f| f.is_empty()) {
            let name = ["symbol", "id", "currency"][position];
            return Err(malformed(format!("{} is empty", name)));
        }

        Ok(Self::new(fields[0], fields[1], fields[2]))
    }
}
