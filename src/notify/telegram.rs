//! Telegram Bot API notifier

use crate::config::TelegramConfig;
use crate::notify::traits::{Notifier, NotifyError, NotifyResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Body of a `sendMessage` call
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Sends messages through a Telegram bot
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// Creates a notifier from the `[telegram]` config section
    pub fn new(config: &TelegramConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        })
    }

    /// Full `sendMessage` endpoint URL
    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn notify(&self, text: &str) -> NotifyResult<()> {
        if self.bot_token.trim().is_empty() || self.chat_id.trim().is_empty() {
            return Err(NotifyError::NotConfigured(
                "telegram bot-token and chat-id are required".to_string(),
            ));
        }

        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status { status, body });
        }

        tracing::info!(chat_id = self.chat_id.as_str(), "Telegram notification sent");
        Ok(())
    }
}
