//! # Telegram Bot API Client
//!
//! File: cli/src/commands/bot/telegram.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! A minimal client for the subset of the Telegram Bot API the bot uses:
//!
//! - `getMe`: startup sanity check of the token
//! - `getUpdates`: long polling for messages and button presses
//! - `sendMessage`: HTML replies, optionally with an inline keyboard
//! - `answerCallbackQuery`: acknowledges a button press
//!
//! Every method is a JSON `POST` to `<api_base_url>/bot<token>/<method>`, and
//! every response is the envelope `{"ok": bool, "result": ..., "description": ...}`.
//!
//! `TelegramChat` adapts one chat to the `ChatSink` trait: the reply text is one
//! message, and the alternatives (if any) follow as a second message whose
//! buttons carry the selection tokens as callback data.
//!
use crate::core::error::Result;
use crate::core::service::{ChatSink, Reply};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Telegram rejects `callback_data` longer than this many bytes.
pub const MAX_CALLBACK_DATA_BYTES: usize = 64;

/// Slack added on top of the long-poll timeout for the HTTP request itself.
const POLL_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub first_name: String,
    pub username: Option<String>,
}

impl User {
    /// `@username` when set, otherwise the first name.
    pub fn display(&self) -> String {
        match &self.username {
            Some(username) => format!("@{}", username),
            None => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    /// One button per row.
    pub fn column(buttons: Vec<InlineKeyboardButton>) -> Self {
        Self {
            inline_keyboard: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &InlineKeyboardButton> {
        self.inline_keyboard.iter().flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl InlineKeyboardButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: Some(data.into()),
            url: None,
        }
    }

    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: None,
            url: Some(url.into()),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 2],
}

#[derive(Debug, Serialize)]
struct AnswerCallbackQuery<'a> {
    callback_query_id: &'a str,
}

/// # Telegram Client (`TelegramClient`)
#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: Client,
    endpoint: String,
    poll_timeout: Duration,
}

impl TelegramClient {
    /// `api_base_url` is usually `https://api.telegram.org`.
    pub fn new(api_base_url: &str, token: &str, poll_timeout_secs: u64) -> Result<Self> {
        let poll_timeout = Duration::from_secs(poll_timeout_secs);
        let client = Client::builder()
            .timeout(poll_timeout + POLL_GRACE)
            .build()
            .context("Failed to create the Telegram HTTP client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/bot{}", api_base_url.trim_end_matches('/'), token),
            poll_timeout,
        })
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("Telegram API call: {}", method);
        let response = self
            .client
            .post(format!("{}/{}", self.endpoint, method))
            .json(body)
            .send()
            .await
            // The URL embeds the token; keep it out of the error text.
            .map_err(|e| anyhow!("Telegram '{}' request failed: {}", method, e.without_url()))?;
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| {
                anyhow!(
                    "Telegram '{}' returned an unreadable body: {}",
                    method,
                    e.without_url()
                )
            })?;

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(anyhow!(
                "Telegram '{}' failed: {}",
                method,
                description.unwrap_or_else(|| "no description".to_string())
            )),
        }
    }

    /// Returns the bot's own account.
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Long-polls for updates with `update_id >= offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let request = GetUpdates {
            offset,
            timeout: self.poll_timeout.as_secs(),
            allowed_updates: ["message", "callback_query"],
        };
        self.call("getUpdates", &request).await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message> {
        let request = SendMessage {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
            reply_markup: keyboard,
        };
        self.call("sendMessage", &request).await
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<bool> {
        self.call("answerCallbackQuery", &AnswerCallbackQuery { callback_query_id })
            .await
    }
}

/// A `ChatSink` bound to one Telegram chat.
pub struct TelegramChat<'a> {
    client: &'a TelegramClient,
    chat_id: i64,
}

impl<'a> TelegramChat<'a> {
    pub fn new(client: &'a TelegramClient, chat_id: i64) -> Self {
        Self { client, chat_id }
    }
}

#[async_trait]
impl ChatSink for TelegramChat<'_> {
    async fn deliver(&self, reply: &Reply) -> Result<()> {
        for (text, keyboard) in reply_messages(reply) {
            self.client
                .send_message(self.chat_id, &text, keyboard.as_ref())
                .await?;
        }
        Ok(())
    }
}

/// The messages a reply becomes: its text, then the prompt with one button per
/// alternative when there are any.
pub fn reply_messages(reply: &Reply) -> Vec<(String, Option<InlineKeyboardMarkup>)> {
    let mut messages = vec![(reply.text.clone(), None)];
    match &reply.prompt {
        Some(prompt) if !reply.alternatives.is_empty() => {
            messages.push((prompt.clone(), Some(alternatives_keyboard(reply))));
        }
        _ => {}
    }
    messages
}

/// One button per alternative, carrying its selection token as callback data.
pub fn alternatives_keyboard(reply: &Reply) -> InlineKeyboardMarkup {
    let buttons = reply
        .alternatives
        .iter()
        .map(|alternative| {
            InlineKeyboardButton::callback(&alternative.label, alternative.payload.encode())
        })
        .collect();
    InlineKeyboardMarkup::column(buttons)
}
