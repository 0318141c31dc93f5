//! Telegram notifications for homework status changes.
//!
//! This crate provides:
//! - The `MessageSender` capability and a teloxide implementation
//! - The duplicate-suppression rule for consecutive notifications
//! - A `Notifier` that delivers best-effort and never fails the caller

pub mod config;
pub mod notifier;
pub mod telegram;

pub use config::TelegramConfig;
pub use notifier::{is_new_message, MessageSender, NotifyError, Notifier};
pub use telegram::TelegramBot;
