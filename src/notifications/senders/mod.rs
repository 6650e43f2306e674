use async_trait::async_trait;
use thiserror::Error;

pub mod console;
pub mod telegram;

#[derive(Debug, Error)]
pub enum SenderError {
    #[error("Failed to send notification: {0}")]
    SendFailed(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// A destination for monitor messages. A rejected message is a hard
/// failure: the run must not record the alert as delivered.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), SenderError>;
}
