//! # PriceBot Console Output (`common::ui`)
//!
//! File: cli/src/common/ui/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `ConsoleSink` is the terminal counterpart of the Telegram chat: it prints a
//! `Reply` to stdout as plain text. Alternatives cannot be tapped in a terminal,
//! so each one is listed with the command that selects it:
//!
//! ```text
//! Bitcoin
//! 1 BTC = 67187 USD
//!
//! Last updated: 3 minutes ago
//!
//! Check other coins with the same symbol BTC
//!   1. Bitcoin Cash
//!      pricebot choose 'btc&&bitcoin-cash&&usd' --label 'Bitcoin Cash'
//! ```
//!
use crate::core::error::Result;
use crate::core::service::{ChatSink, Reply};
use async_trait::async_trait;

/// Prints replies to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

#[async_trait]
impl ChatSink for ConsoleSink {
    async fn deliver(&self, reply: &Reply) -> Result<()> {
        println!("{}", format_reply(reply));
        Ok(())
    }
}

/// Formats `reply` the way `ConsoleSink` prints it (without the final newline).
pub fn format_reply(reply: &Reply) -> String {
    let mut out = reply.text.clone();
    if let Some(prompt) = &reply.prompt {
        out.push_str("\n\n");
        out.push_str(prompt);
        for (index, alternative) in reply.alternatives.iter().enumerate() {
            out.push_str(&format!(
                "\n  {}. {}\n     pricebot choose {} --label {}",
                index + 1,
                alternative.label,
                shell_quote(&alternative.payload.encode()),
                shell_quote(&alternative.label)
            ));
        }
    }
    out
}

/// Single-quotes `value` for POSIX shells (`&&` must not reach the shell bare).
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
