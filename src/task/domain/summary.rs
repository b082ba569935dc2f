//! Per-user task statistics.

use super::{ListedTask, TaskStatus};
use serde::{Deserialize, Serialize};

/// Number of listing entries surfaced as recent tasks.
pub const RECENT_TASK_LIMIT: usize = 5;

/// Status counts and the head of the active listing for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    /// Number of active tasks.
    pub total: usize,
    /// Active tasks with status `completed`.
    pub completed: usize,
    /// Active tasks with status `overdue`.
    pub overdue: usize,
    /// Active tasks with status `pending`.
    pub pending: usize,
    /// First entries of the active listing.
    pub recent: Vec<ListedTask>,
}

impl TaskSummary {
    /// Builds a summary from an already ordered active listing.
    #[must_use]
    pub fn from_listing(listing: &[ListedTask]) -> Self {
        let count = |status: TaskStatus| {
            listing
                .iter()
                .filter(|entry| entry.status == status)
                .count()
        };

        Self {
            total: listing.len(),
            completed: count(TaskStatus::Completed),
            overdue: count(TaskStatus::Overdue),
            pending: count(TaskStatus::Pending),
            recent: listing.iter().take(RECENT_TASK_LIMIT).cloned().collect(),
        }
    }
}
