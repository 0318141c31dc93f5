//! Application configuration.
//!
//! Credentials come from the environment only; polling settings come from
//! the command line (or their environment fallbacks) with the defaults below.

use homework_alerts::TelegramConfig;
use homework_api::{ClientConfig, DEFAULT_ENDPOINT};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the Practicum OAuth token.
pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";
/// Environment variable holding the Telegram bot token.
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
/// Environment variable holding the target chat id.
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

/// Older names still accepted when the primary variable is unset.
const LEGACY_NAMES: &[(&str, &str)] = &[
    (TELEGRAM_TOKEN_VAR, "TOKEN"),
    (TELEGRAM_CHAT_ID_VAR, "CHAT_ID"),
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),
    #[error("Status API client: {0}")]
    Api(#[from] homework_api::ApiError),
    #[error("Telegram bot: {0}")]
    Telegram(#[from] homework_alerts::NotifyError),
}

/// Secrets required before the bot may start.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}

impl Credentials {
    /// Load credentials from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load credentials through `lookup`. Empty or whitespace-only values
    /// count as missing; every missing name is reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str| -> Option<String> {
            let legacy = LEGACY_NAMES
                .iter()
                .filter(|(primary, _)| *primary == name)
                .map(|(_, legacy)| *legacy);
            std::iter::once(name)
                .chain(legacy)
                .filter_map(&lookup)
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let practicum_token = read(PRACTICUM_TOKEN_VAR);
        let telegram_token = read(TELEGRAM_TOKEN_VAR);
        let telegram_chat_id = read(TELEGRAM_CHAT_ID_VAR);

        match (practicum_token, telegram_token, telegram_chat_id) {
            (Some(practicum_token), Some(telegram_token), Some(telegram_chat_id)) => Ok(Self {
                practicum_token,
                telegram_token,
                telegram_chat_id,
            }),
            (practicum_token, telegram_token, telegram_chat_id) => {
                let missing = [
                    (PRACTICUM_TOKEN_VAR, practicum_token.is_none()),
                    (TELEGRAM_TOKEN_VAR, telegram_token.is_none()),
                    (TELEGRAM_CHAT_ID_VAR, telegram_chat_id.is_none()),
                ]
                .into_iter()
                .filter(|(_, missing)| *missing)
                .map(|(name, _)| name)
                .collect();
                Err(ConfigError::MissingCredentials(missing))
            }
        }
    }
}

/// Polling settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollingSettings {
    /// Status API endpoint.
    pub endpoint: String,
    /// Pause between two polls.
    pub retry_period: Duration,
    /// Timeout for a single HTTP call (status API or Telegram).
    pub request_timeout: Duration,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            retry_period: Duration::from_secs(600),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub polling: PollingSettings,
}

impl AppConfig {
    pub fn new(credentials: Credentials, polling: PollingSettings) -> Self {
        Self {
            credentials,
            polling,
        }
    }

    /// Settings for the status API client.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.polling.endpoint.clone(),
            token: self.credentials.practicum_token.clone(),
            timeout: self.polling.request_timeout,
        }
    }

    /// Settings for the Telegram bot.
    pub fn telegram_config(&self) -> TelegramConfig {
        TelegramConfig {
            bot_token: self.credentials.telegram_token.clone(),
            request_timeout: self.polling.request_timeout,
        }
    }
}
