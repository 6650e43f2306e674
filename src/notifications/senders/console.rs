use async_trait::async_trait;
use tracing::info;

use super::{NotificationSender, SenderError};

/// Fallback for runs without Telegram credentials: logs the message a
/// configured deployment would have sent.
pub struct ConsoleSender;

#[async_trait]
impl NotificationSender for ConsoleSender {
    async fn send(&self, message: &str) -> Result<(), SenderError> {
        info!(message = %message, "Notification not sent (Telegram not configured).");
        Ok(())
    }
}
