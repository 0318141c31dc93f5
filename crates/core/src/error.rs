//! Errors raised while validating status API answers.

use thiserror::Error;

/// Errors produced by response validation and status formatting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HomeworkError {
    /// A required top-level key is absent from the API answer.
    #[error("Empty or unexpected API response: missing key `{0}`")]
    EmptyResponse(&'static str),

    /// A value has the wrong JSON type.
    #[error("Expected {expected} in `{field}`, got {found}")]
    UnexpectedType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Homework has no `homework_name` key")]
    MissingHomeworkName,

    /// The status is missing or not one of the known verdicts.
    #[error("Unknown homework status: {0}")]
    UnknownStatus(String),
}

impl HomeworkError {
    /// Short name of the error class, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            HomeworkError::EmptyResponse(_) | HomeworkError::UnexpectedType { .. } => {
                "malformed_response"
            }
            HomeworkError::MissingHomeworkName => "missing_homework_name",
            HomeworkError::UnknownStatus(_) => "unknown_status",
        }
    }
}

/// Result type for validation operations.
pub type HomeworkResult<T> = Result<T, HomeworkError>;
