//! Telegram delivery through the Bot API.

use crate::config::TelegramConfig;
use crate::notifier::{MessageSender, NotifyError};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, Recipient};

/// Telegram bot wrapper.
pub struct TelegramBot {
    bot: Bot,
}

impl TelegramBot {
    /// Create a bot whose Bot API calls are bounded by the configured timeout.
    pub fn new(config: &TelegramConfig) -> Result<Self, NotifyError> {
        let client = teloxide::net::default_reqwest_settings()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| NotifyError::Client(e.to_string()))?;

        Ok(Self {
            bot: Bot::with_client(&config.bot_token, client),
        })
    }

    /// Get the underlying bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

#[async_trait]
impl MessageSender for TelegramBot {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        let recipient = parse_recipient(chat_id)?;
        self.bot.send_message(recipient, text).await?;
        Ok(())
    }
}

/// Numeric chat ids and `@channel` usernames are accepted.
pub fn parse_recipient(chat_id: &str) -> Result<Recipient, NotifyError> {
    let chat_id = chat_id.trim();
    if let Ok(id) = chat_id.parse::<i64>() {
        return Ok(Recipient::Id(ChatId(id)));
    }
    if chat_id.len() > 1 && chat_id.starts_with('@') {
        return Ok(Recipient::ChannelUsername(chat_id.to_string()));
    }
    Err(NotifyError::InvalidChatId(chat_id.to_string()))
}
