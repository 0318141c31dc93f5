//! Homework status polling loop.
//!
//! One iteration: fetch statuses since the cursor, validate the answer,
//! move the cursor, render the latest status and notify the chat if the text
//! is new. Every iteration is followed by the same fixed sleep, whatever
//! happened. No error escapes an iteration.

use homework_alerts::{is_new_message, Notifier};
use homework_api::{ApiError, StatusSource};
use homework_core::{parse_status, validate_response, HomeworkError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// Sent once before the first poll.
pub const START_MESSAGE: &str = "Бот начал работу";
/// Logged when the API reports no homework changes.
pub const NO_NEW_STATUSES: &str = "Нет новых статусов";
/// Prefix of the failure text relayed to the chat.
pub const FAILURE_PREFIX: &str = "Сбой в работе программы";

/// Errors that abort a single iteration.
#[derive(Error, Debug)]
pub enum PollError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Homework(#[from] HomeworkError),
}

impl PollError {
    /// Short name of the error class, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            PollError::Api(e) => e.kind(),
            PollError::Homework(e) => e.kind(),
        }
    }

    /// Errors that are only logged and never relayed to the chat.
    pub fn is_silent(&self) -> bool {
        matches!(self, PollError::Homework(HomeworkError::EmptyResponse(_)))
    }
}

/// What a single iteration ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A new status text was handed to the notifier.
    Notified(String),
    /// The status text was already sent.
    Unchanged,
    /// The API reported no homeworks in the window.
    NoNewStatus,
    /// An expected failure, logged only.
    Silenced,
    /// A failure that was logged and relayed to the chat if not yet reported.
    Reported(String),
}

/// State carried between iterations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    /// Start of the next query window, unix seconds.
    pub cursor: i64,
    /// Last text sent, or last failure text reported.
    pub last_message: String,
}

impl PollState {
    pub fn new(cursor: i64) -> Self {
        Self {
            cursor,
            last_message: String::new(),
        }
    }

    /// Moves the cursor forward; never moves it back.
    pub fn advance_cursor(&mut self, to: i64) {
        if to < self.cursor {
            warn!(
                cursor = self.cursor,
                reported = to,
                "API reported a date before the cursor, keeping cursor"
            );
            return;
        }
        self.cursor = to;
    }
}

/// Current wall-clock time in unix seconds.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// The notifier loop.
pub struct Poller {
    source: Arc<dyn StatusSource>,
    notifier: Notifier,
    retry_period: Duration,
    state: PollState,
}

impl Poller {
    /// Create a poller whose cursor starts at the current time.
    pub fn new(source: Arc<dyn StatusSource>, notifier: Notifier, retry_period: Duration) -> Self {
        Self::with_state(source, notifier, retry_period, PollState::new(unix_now()))
    }

    pub fn with_state(
        source: Arc<dyn StatusSource>,
        notifier: Notifier,
        retry_period: Duration,
        state: PollState,
    ) -> Self {
        Self {
            source,
            notifier,
            retry_period,
            state,
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Tell the chat the bot is up. Failure is only logged.
    pub async fn announce_start(&self) {
        self.notifier.notify(START_MESSAGE).await;
        info!("{}", START_MESSAGE);
    }

    /// Poll forever.
    pub async fn run(mut self) {
        info!(
            retry_period_secs = self.retry_period.as_secs(),
            cursor = self.state().cursor,
            "Starting homework status polling"
        );
        loop {
            self.cycle().await;
        }
    }

    /// One iteration followed by the fixed sleep.
    pub async fn cycle(&mut self) -> PollOutcome {
        let outcome = self.poll_once().await;
        tokio::time::sleep(self.retry_period).await;
        outcome
    }

    /// One iteration without the sleep.
    #[tracing::instrument(name = "poll_once", skip(self), fields(cursor = self.state.cursor))]
    pub async fn poll_once(&mut self) -> PollOutcome {
        match self.check_status().await {
            Ok(None) => {
                info!("{}", NO_NEW_STATUSES);
                PollOutcome::NoNewStatus
            }
            Ok(Some(message)) => {
                if is_new_message(&self.state.last_message, &message) {
                    self.notifier.notify(&message).await;
                    self.state.last_message = message.clone();
                    PollOutcome::Notified(message)
                } else {
                    info!("{}", message);
                    PollOutcome::Unchanged
                }
            }
            Err(e) if e.is_silent() => {
                error!(kind = e.kind(), error = %e, "{}: {}", FAILURE_PREFIX, e);
                PollOutcome::Silenced
            }
            Err(e) => {
                let message = format!("{}: {}", FAILURE_PREFIX, e);
                error!(kind = e.kind(), error = %e, "{}", message);
                if !self.state.last_message.contains(&message) {
                    self.notifier.notify(&message).await;
                }
                self.state.last_message = message.clone();
                PollOutcome::Reported(message)
            }
        }
    }

    /// Fetch, validate and render. `Ok(None)` means no homeworks in the window.
    async fn check_status(&mut self) -> Result<Option<String>, PollError> {
        let body = self.source.get_api_answer(self.state.cursor).await?;
        info!("Checking API response");
        let response = validate_response(&body)?;

        self.state
            .advance_cursor(response.current_date.unwrap_or_else(unix_now));

        match response.latest() {
            None => Ok(None),
            Some(homework) => {
                info!("Extracting homework status");
                Ok(Some(parse_status(homework)?))
            }
        }
    }
}
