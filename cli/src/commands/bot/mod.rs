//! # PriceBot Telegram Bot
//!
//! File: cli/src/commands/bot/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `pricebot bot` runs the Telegram front-end. It long-polls the Bot API for
//! updates and answers each one in turn through the shared `PriceService`.
//!
//! ## Architecture
//!
//! - `telegram.rs`: Bot API client, update types and the `TelegramChat` sink
//! - `dispatch.rs`: parsing of slash commands and button presses
//! - `menu.rs`: the `/start`, `/coins` and `/currencies` texts
//!
//! Startup flow:
//! 1. `App::init` loads secrets, configuration and the reference catalog
//! 2. `getMe` checks the bot token
//! 3. The polling loop runs until Ctrl+C or SIGTERM. An update that is being
//!    handled is always finished first.
//!
//! A failure while handling one update is logged and does not stop the loop.
//! A failed poll is retried after a short pause.
//!
//! ```bash
//! export TELEGRAM_BOT_API_TOKEN=...
//! export COINGECKO_API_KEY=...
//! pricebot bot -v
//! ```
//!
use crate::core::{
    app::App,
    config::ConfigOverrides,
    error::{PriceBotError, Result},
    markup::Markup,
    service::{ChatSink, PriceQuery, Reply},
};
use anyhow::Context;
use clap::Parser;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub mod dispatch;
pub mod menu;
pub mod telegram;

use dispatch::{BotCommand, CallbackAction};
use telegram::{
    CallbackQuery, Message, TelegramChat, TelegramClient, Update, MAX_CALLBACK_DATA_BYTES,
};

/// Pause after a failed `getUpdates` call.
const POLL_RETRY_PAUSE: Duration = Duration::from_secs(5);

/// # Bot Command Arguments (`BotArgs`)
#[derive(Parser, Debug)]
#[command(about = "Run the Telegram price bot")]
pub struct BotArgs {
    /// Long-poll timeout in seconds (overrides `telegram.poll_timeout_secs`).
    #[arg(long)]
    poll_timeout: Option<u64>,
}

/// # Handle Bot Command (`handle_bot`)
pub async fn handle_bot(args: BotArgs, overrides: &ConfigOverrides) -> Result<()> {
    info!("Handling bot command...");
    debug!("Bot args: {:?}", args);

    let mut app = App::init(overrides, Markup::Html).await?;
    app.service = app.service.with_max_payload_len(MAX_CALLBACK_DATA_BYTES);
    let telegram = TelegramClient::new(
        &app.config.telegram.api_base_url,
        &app.secrets.bot_token,
        args.poll_timeout
            .unwrap_or(app.config.telegram.poll_timeout_secs),
    )?;
    let me = telegram
        .get_me()
        .await
        .context("Failed to reach the Telegram Bot API")?;

    println!("PriceBot is running as {}. Press Ctrl+C to stop.", me.display());
    let username = me.username.unwrap_or_default();
    Bot {
        app,
        telegram,
        username,
    }
    .run()
    .await?;
    println!("\nBot shutdown complete.");
    Ok(())
}

struct Bot {
    app: App,
    telegram: TelegramClient,
    /// The bot's own username, matched against `/command@username`.
    username: String,
}

impl Bot {
    async fn run(&self) -> Result<()> {
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);
        let mut offset = 0;

        loop {
            let polled = tokio::select! {
                _ = &mut shutdown => break,
                polled = self.telegram.get_updates(offset) => polled,
            };

            match polled {
                Ok(updates) => {
                    for update in updates {
                        offset = update.update_id + 1;
                        if let Err(e) = self.handle_update(update).await {
                            error!("Failed to handle update: {:#}", e);
                        }
                    }
                }
                Err(e) => {
                    warn!("Polling for updates failed: {:#}", e);
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(POLL_RETRY_PAUSE) => {}
                    }
                }
            }
        }
        Ok(())
    }

    async fn handle_update(&self, update: Update) -> Result<()> {
        debug!("Received update {}", update.update_id);
        if let Some(query) = update.callback_query {
            return self.handle_callback(query).await;
        }
        if let Some(message) = update.message {
            return self.handle_message(message).await;
        }
        Ok(())
    }

    async fn handle_message(&self, message: Message) -> Result<()> {
        let Some(command) = message
            .text
            .as_deref()
            .and_then(|text| dispatch::parse_command(text, &self.username))
        else {
            return Ok(());
        };
        let user = message
            .from
            .as_ref()
            .map(|u| u.display())
            .unwrap_or_default();
        let chat_id = message.chat.id;

        match command {
            BotCommand::Start => {
                let defaults = &self.app.config.defaults;
                let keyboard = menu::start_keyboard(defaults, &self.app.config.telegram);
                self.telegram
                    .send_message(chat_id, &menu::start_text(defaults), Some(&keyboard))
                    .await?;
            }
            BotCommand::Price { symbol, currency } => {
                self.price(chat_id, &user, symbol, currency).await?;
            }
            BotCommand::Coins => {
                let text = menu::coins_text(&self.app.config.telegram.coin_list_link);
                self.telegram.send_message(chat_id, &text, None).await?;
            }
            BotCommand::Currencies => self.currencies(chat_id).await?,
            BotCommand::Unknown(name) => {
                debug!("{} entered an unknown command '{}'", user, name);
            }
        }
        Ok(())
    }

    async fn handle_callback(&self, query: CallbackQuery) -> Result<()> {
        if let Err(e) = self.telegram.answer_callback_query(&query.id).await {
            warn!("Failed to acknowledge button press: {:#}", e);
        }
        let (Some(data), Some(message)) = (query.data.as_deref(), query.message.as_ref()) else {
            return Ok(());
        };
        let user = query.from.display();
        let chat_id = message.chat.id;

        match dispatch::parse_callback(data, message.reply_markup.as_ref()) {
            CallbackAction::Price { symbol, currency } => {
                self.price(chat_id, &user, symbol, currency).await
            }
            CallbackAction::Currencies => self.currencies(chat_id).await,
            CallbackAction::Choice { token, label } => {
                self.choice(chat_id, &user, &token, label).await
            }
            CallbackAction::Unknown(data) => {
                debug!("{} pressed an unknown button '{}'", user, data);
                Ok(())
            }
        }
    }

    async fn price(
        &self,
        chat_id: i64,
        user: &str,
        symbol: Option<String>,
        currency: Option<String>,
    ) -> Result<()> {
        let defaults = &self.app.config.defaults;
        info!(
            "{} asked for {} price in {}",
            user,
            symbol.as_deref().unwrap_or(&defaults.coin).to_uppercase(),
            currency.as_deref().unwrap_or(&defaults.currency).to_uppercase()
        );
        let sink = TelegramChat::new(&self.telegram, chat_id);
        self.app
            .service
            .answer(PriceQuery::new(symbol, currency), &sink)
            .await
    }

    async fn choice(
        &self,
        chat_id: i64,
        user: &str,
        token: &str,
        label: Option<String>,
    ) -> Result<()> {
        info!(
            "{} asked for {} price via '{}'",
            user,
            label.as_deref().unwrap_or("an alternative"),
            token
        );
        let reply: Reply = match self
            .app
            .service
            .handle_disambiguation_choice(token, label)
            .await
        {
            Ok(reply) => reply,
            Err(e) => match e.downcast_ref::<PriceBotError>() {
                Some(PriceBotError::MalformedPayload { .. }) => {
                    warn!("Ignoring button press: {}", e);
                    return Ok(());
                }
                _ => return Err(e),
            },
        };
        TelegramChat::new(&self.telegram, chat_id)
            .deliver(&reply)
            .await
    }

    async fn currencies(&self, chat_id: i64) -> Result<()> {
        let text = menu::currencies_text(self.app.service.catalog().currencies().codes());
        self.telegram.send_message(chat_id, &text, None).await?;
        Ok(())
    }
}

/// # Handle Shutdown Signal (`shutdown_signal`)
///
/// Resolves when Ctrl+C or (on Unix) SIGTERM is received. If a handler cannot
/// be installed, that branch never resolves and the failure is logged.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, stopping the bot..."),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received SIGTERM, stopping the bot...");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
