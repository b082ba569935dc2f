//! Read-time status of a task.

use super::{DueDateTime, ParseTaskStatusError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status shown for a task, derived from its flags and the current instant.
///
/// The status is never stored authoritatively; see [`derive_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// The deadline has passed and the task is not completed.
    Overdue,
    /// The task is open and not late.
    Pending,
    /// The task has been completed.
    Completed,
}

impl TaskStatus {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Returns the listing bucket rank; lower ranks are listed first.
    #[must_use]
    pub const fn bucket_rank(self) -> u8 {
        match self {
            Self::Overdue => 1,
            Self::Pending => 2,
            Self::Completed => 3,
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "overdue" => Ok(Self::Overdue),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derives the status of a task at `now`.
///
/// Completion wins over lateness: a task completed after its deadline is
/// `Completed`, never `Overdue`. A task without a deadline is never overdue.
#[must_use]
pub fn derive_status(completed: bool, due: Option<DueDateTime>, now: DateTime<Utc>) -> TaskStatus {
    if completed {
        return TaskStatus::Completed;
    }
    if due.is_some_and(|deadline| deadline.is_past(now)) {
        return TaskStatus::Overdue;
    }
    TaskStatus::Pending
}
