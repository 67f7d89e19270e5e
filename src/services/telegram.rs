// src/services/telegram.rs

//! Telegram Bot API notifier.
//!
//! Reports are sent as a MarkdownV2 pre-formatted block so table columns
//! stay aligned in the chat client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::TelegramConfig;

use super::Notifier;

/// `sendMessage` request body.
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Delivers reports through a Telegram bot.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
}

impl TelegramNotifier {
    pub fn new(client: Client, api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            token: token.into(),
        }
    }

    pub fn from_config(config: &TelegramConfig, client: Client) -> Self {
        Self::new(client, config.api_base.clone(), config.token.clone())
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.token
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, channel: &str, text: &str) -> Result<()> {
        log::debug!("Telegram message prepared for {}:\n{}", channel, text);

        let body = format_monospace(text);
        let request = SendMessage {
            chat_id: channel,
            text: &body,
            parse_mode: "MarkdownV2",
        };

        // Error URLs embed the bot token, so they are stripped before logging
        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::delivery(channel, e.without_url()))?;

        let status = response.status();
        let reply: Option<ApiResponse> = response.json().await.ok();

        match reply {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(ApiResponse { description, .. }) => Err(AppError::delivery(
                channel,
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    description.unwrap_or_else(|| "no description".into())
                ),
            )),
            None => Err(AppError::delivery(
                channel,
                format!("HTTP {}: unreadable response", status.as_u16()),
            )),
        }
    }
}

/// Wrap text in a MarkdownV2 pre block.
///
/// Inside pre blocks only `\` and `` ` `` need escaping.
pub fn format_monospace(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if c == '\\' || c == '`' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("```\n{escaped}\n```")
}
