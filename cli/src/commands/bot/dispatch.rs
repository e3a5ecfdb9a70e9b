//! # Bot Command Dispatch
//!
//! File: cli/src/commands/bot/dispatch.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Pure parsing of incoming chat text and button presses into actions. Nothing
//! here performs I/O, so every routing rule is unit-tested directly.
//!
//! | Input                      | Action                                         |
//! |----------------------------|------------------------------------------------|
//! | `/start`                   | `Start`                                        |
//! | `/p`, `/price [coin] [cur]`| `Price`; currency only when exactly 2 args     |
//! | `/btc`, `/eth [cur]`       | `Price`; currency only when exactly 1 arg      |
//! | `/coins`                   | `Coins`                                        |
//! | `/currencies`              | `Currencies`                                   |
//! | button `btc` / `eth`       | `Price` in the default currency                |
//! | button `currencies`        | `Currencies`                                   |
//! | button `sym&&id&&cur`      | `Choice`, label taken from the pressed button  |
//!
use super::telegram::InlineKeyboardMarkup;
use crate::core::payload::ChoicePayload;

/// A slash command from a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Price {
        symbol: Option<String>,
        currency: Option<String>,
    },
    Coins,
    Currencies,
    Unknown(String),
}

/// What a button press asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Price {
        symbol: Option<String>,
        currency: Option<String>,
    },
    Currencies,
    /// A disambiguation choice; `label` is the text of the pressed button.
    Choice {
        token: String,
        label: Option<String>,
    },
    Unknown(String),
}

/// # Parse Command (`parse_command`)
///
/// Returns `None` for text that is not a slash command, and for a command
/// addressed to another bot. Group chats send commands as `/price@botname`;
/// the suffix must match `bot_username` (case-insensitively).
pub fn parse_command(text: &str, bot_username: &str) -> Option<BotCommand> {
    let mut words = text.split_whitespace();
    let head = words.next()?.strip_prefix('/')?;
    let name = match head.split_once('@') {
        Some((name, addressee)) if addressee.eq_ignore_ascii_case(bot_username) => name,
        Some(_) => return None,
        None => head,
    }
    .to_lowercase();
    let args: Vec<String> = words.map(str::to_string).collect();

    let command = match name.as_str() {
        "start" => BotCommand::Start,
        "p" | "price" => BotCommand::Price {
            symbol: args.first().cloned(),
            currency: if args.len() == 2 {
                args.get(1).cloned()
            } else {
                None
            },
        },
        "btc" | "eth" => BotCommand::Price {
            symbol: Some(name.clone()),
            currency: if args.len() == 1 {
                args.first().cloned()
            } else {
                None
            },
        },
        "coins" => BotCommand::Coins,
        "currencies" => BotCommand::Currencies,
        _ => BotCommand::Unknown(name),
    };
    Some(command)
}

/// # Parse Callback (`parse_callback`)
///
/// `keyboard` is the inline keyboard of the message the button belongs to; it
/// is searched for the button whose callback data equals `data` to recover the
/// coin's display name.
pub fn parse_callback(data: &str, keyboard: Option<&InlineKeyboardMarkup>) -> CallbackAction {
    if ChoicePayload::is_encoded(data) {
        let label = keyboard.and_then(|markup| {
            markup
                .buttons()
                .find(|button| button.callback_data.as_deref() == Some(data))
                .map(|button| button.text.clone())
        });
        return CallbackAction::Choice {
            token: data.to_string(),
            label,
        };
    }

    match data {
        "btc" | "eth" => CallbackAction::Price {
            symbol: Some(data.to_string()),
            currency: None,
        },
        "currencies" => CallbackAction::Currencies,
        other => CallbackAction::Unknown(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::bot::telegram::InlineKeyboardButton;

    fn parse(text: &str) -> Option<BotCommand> {
        parse_command(text, "PriceBot")
    }

    fn price(symbol: Option<&str>, currency: Option<&str>) -> BotCommand {
        BotCommand::Price {
            symbol: symbol.map(str::to_string),
            currency: currency.map(str::to_string),
        }
    }

    #[test]
    fn test_price_argument_rules() {
        assert_eq!(parse("/p"), Some(price(None, None)));
        assert_eq!(parse("/price eth"), Some(price(Some("eth"), None)));
        assert_eq!(
            parse("/price btc vnd"),
            Some(price(Some("btc"), Some("vnd")))
        );
        // Three arguments: the currency is ignored.
        assert_eq!(
            parse("/p btc vnd extra"),
            Some(price(Some("btc"), None))
        );
    }

    #[test]
    fn test_shortcut_argument_rules() {
        assert_eq!(parse("/btc"), Some(price(Some("btc"), None)));
        assert_eq!(parse("/eth sgd"), Some(price(Some("eth"), Some("sgd"))));
        assert_eq!(parse("/eth sgd usd"), Some(price(Some("eth"), None)));
    }

    #[test]
    fn test_other_commands() {
        assert_eq!(parse("/start"), Some(BotCommand::Start));
        assert_eq!(parse("/coins@PriceBot"), Some(BotCommand::Coins));
        assert_eq!(parse("/Currencies"), Some(BotCommand::Currencies));
        assert_eq!(
            parse("/help"),
            Some(BotCommand::Unknown("help".into()))
        );
        assert_eq!(parse("hello there"), None);
        assert_eq!(parse("   "), None);
    }

    #[test]
    fn test_commands_addressed_to_other_bots_are_ignored() {
        assert_eq!(parse("/price@pricebot eth"), Some(price(Some("eth"), None)));
        assert_eq!(parse("/price@SomeOtherBot eth"), None);
        assert_eq!(parse("/start@"), None);
    }

    #[test]
    fn test_menu_callbacks() {
        assert_eq!(
            parse_callback("eth", None),
            CallbackAction::Price {
                symbol: Some("eth".into()),
                currency: None
            }
        );
        assert_eq!(parse_callback("currencies", None), CallbackAction::Currencies);
        assert_eq!(
            parse_callback("bogus", None),
            CallbackAction::Unknown("bogus".into())
        );
    }

    #[test]
    fn test_choice_recovers_label_from_keyboard() {
        let keyboard = InlineKeyboardMarkup::column(vec![
            InlineKeyboardButton::callback("Bitcoin Cash", "btc&&bitcoin-cash&&usd"),
            InlineKeyboardButton::callback("Some Other BTC Coin", "btc&&some-other-btc-coin&&usd"),
        ]);
        assert_eq!(
            parse_callback("btc&&some-other-btc-coin&&usd", Some(&keyboard)),
            CallbackAction::Choice {
                token: "btc&&some-other-btc-coin&&usd".into(),
                label: Some("Some Other BTC Coin".into()),
            }
        );
        assert_eq!(
            parse_callback("btc&&gone&&usd", Some(&keyboard)),
            CallbackAction::Choice {
                token: "btc&&gone&&usd".into(),
                label: None,
            }
        );
    }
}
