//! Error types for task domain validation and parsing.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned while validating task input.
///
/// Every variant describes a user-input problem. None of them involve the
/// store, so callers can surface the message directly.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title is longer than the store accepts.
    #[error("task title must be at most {max} characters")]
    TitleTooLong {
        /// Maximum number of characters.
        max: usize,
    },

    /// The task description is empty after trimming.
    #[error("task description must not be empty")]
    EmptyDescription,

    /// No due date was supplied where one is required.
    #[error("a due date is required")]
    MissingDueDate,

    /// The due date is not a `YYYY-MM-DD` calendar date.
    #[error("invalid due date '{0}', expected YYYY-MM-DD")]
    InvalidDueDate(String),

    /// The due time is not an `HH:MM` or `HH:MM:SS` clock time.
    #[error("invalid due time '{0}', expected HH:MM")]
    InvalidDueTime(String),

    /// The due timestamp lies before the submission instant.
    #[error("due time {due} is in the past (now is {now})")]
    DueInPast {
        /// Requested due timestamp.
        due: DateTime<Utc>,
        /// Instant the request was validated at.
        now: DateTime<Utc>,
    },

    /// A bulk operation was requested without any task identifiers.
    #[error("no tasks selected")]
    EmptySelection,

    /// A task identifier could not be parsed.
    #[error("invalid task identifier '{0}'")]
    InvalidTaskId(String),
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
