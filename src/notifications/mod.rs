//! Outbound notification dispatch.

use std::time::Duration;

use thiserror::Error;
use tracing::info;

pub mod senders;

use senders::console::ConsoleSender;
use senders::telegram::TelegramSender;
use senders::{NotificationSender, SenderError};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Sender error: {0}")]
    Sender(#[from] SenderError),
}

/// Owns the configured sender and dispatches monitor messages through it.
pub struct NotificationService {
    sender: Box<dyn NotificationSender>,
}

impl NotificationService {
    /// Picks the Telegram sender when both credentials are present,
    /// otherwise the console fallback: a half-configured deployment keeps
    /// running and shows what it would have sent.
    pub fn from_credentials(
        bot_token: Option<String>,
        chat_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self, NotificationError> {
        let sender: Box<dyn NotificationSender> = match (bot_token, chat_id) {
            (Some(bot_token), Some(chat_id)) => {
                Box::new(TelegramSender::new(bot_token, chat_id, timeout)?)
            }
            _ => {
                info!("BOT_TOKEN/CHAT_ID not set. Messages will be logged instead of sent.");
                Box::new(ConsoleSender)
            }
        };
        Ok(Self { sender })
    }

    pub fn with_sender(sender: Box<dyn NotificationSender>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, message: &str) -> Result<(), NotificationError> {
        self.sender.send(message).await?;
        Ok(())
    }
}
