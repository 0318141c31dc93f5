//! Notification delivery and duplicate suppression.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Telegram API error: {0}")]
    Api(#[from] teloxide::RequestError),
    #[error("Invalid chat id: {0:?}")]
    InvalidChatId(String),
    #[error("Failed to build Telegram client: {0}")]
    Client(String),
    /// Delivery refused by a non-Telegram sender.
    #[error("Message rejected: {0}")]
    Rejected(String),
}

/// Capability to deliver a plain-text message to a chat.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), NotifyError>;
}

/// Returns true if `message` should be sent after `previous`.
///
/// A message is suppressed when it equals the previous one or is a
/// substring of it. The containment check also suppresses a shorter, distinct
/// message that happens to occur inside the previous text.
pub fn is_new_message(previous: &str, message: &str) -> bool {
    message != previous && !previous.contains(message)
}

/// Best-effort delivery to a single chat.
#[derive(Clone)]
pub struct Notifier {
    sender: Arc<dyn MessageSender>,
    chat_id: String,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl Notifier {
    /// Create a notifier for one chat.
    pub fn new(sender: Arc<dyn MessageSender>, chat_id: impl Into<String>) -> Self {
        Self {
            sender,
            chat_id: chat_id.into(),
        }
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Send `text`, logging the outcome. Returns whether delivery succeeded.
    /// Delivery failures are logged and never propagated.
    pub async fn notify(&self, text: &str) -> bool {
        info!(chat_id = %self.chat_id, "Sending message to Telegram");
        match self.sender.send_message(&self.chat_id, text).await {
            Ok(()) => {
                debug!(chat_id = %self.chat_id, text, "Message delivered");
                info!(chat_id = %self.chat_id, "Message sent to Telegram");
                true
            }
            Err(e) => {
                error!(
                    chat_id = %self.chat_id,
                    kind = "notification_delivery_failure",
                    error = %e,
                    "Failed to send message to Telegram"
                );
                false
            }
        }
    }
}
