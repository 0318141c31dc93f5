//! Telegram bot configuration.

use std::time::Duration;

/// Settings for the Telegram bot connection.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot API token
    pub bot_token: String,
    /// Timeout for a single Bot API call
    pub request_timeout: Duration,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl TelegramConfig {
    /// Create a config with the default timeout.
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            request_timeout: Duration::from_secs(30),
        }
    }
}
