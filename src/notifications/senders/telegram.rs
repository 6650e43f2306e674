use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{NotificationSender, SenderError};

/// Pushes messages through the Telegram Bot API.
pub struct TelegramSender {
    client: Client,
    bot_token: String,
    chat_id: String,
}

#[derive(Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
}

impl TelegramSender {
    pub fn new(
        bot_token: String,
        chat_id: String,
        timeout: Duration,
    ) -> Result<Self, SenderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            bot_token,
            chat_id,
        })
    }
}

#[async_trait]
impl NotificationSender for TelegramSender {
    async fn send(&self, message: &str) -> Result<(), SenderError> {
        let api_url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.bot_token
        );
        let payload = SendMessagePayload {
            chat_id: &self.chat_id,
            text: message,
        };

        let response = self.client.post(&api_url).json(&payload).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(SenderError::SendFailed(format!(
                "Telegram API returned non-success status: {status}. Body: {error_body}"
            )));
        }

        Ok(())
    }
}
