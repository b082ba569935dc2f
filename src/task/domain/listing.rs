//! Listing order for active tasks and the trash.

use super::{Task, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};

/// A task paired with the status derived for it at listing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedTask {
    /// The listed task.
    pub task: Task,
    /// Status derived at the listing instant.
    pub status: TaskStatus,
}

impl ListedTask {
    /// Derives the status of `task` at `now`.
    #[must_use]
    pub fn at(task: Task, now: DateTime<Utc>) -> Self {
        let status = task.status(now);
        Self { task, status }
    }
}

/// Orders two tasks for the active listing at `now`.
///
/// Overdue tasks come first, then pending, then completed. Completed tasks
/// are listed most recently updated first; open tasks soonest deadline first
/// with undated tasks last. Ties fall back to creation time, then identifier.
#[must_use]
pub fn compare_for_listing(a: &Task, b: &Task, now: DateTime<Utc>) -> Ordering {
    let a_status = a.status(now);
    let b_status = b.status(now);

    a_status
        .bucket_rank()
        .cmp(&b_status.bucket_rank())
        .then_with(|| {
            if a_status == TaskStatus::Completed {
                b.updated_at().cmp(&a.updated_at())
            } else {
                compare_deadlines(a, b)
            }
        })
        .then_with(|| a.created_at().cmp(&b.created_at()))
        .then_with(|| a.id().cmp(&b.id()))
}

/// Sorts active tasks into listing order and pairs each with its status.
#[must_use]
pub fn sort_for_listing(mut tasks: Vec<Task>, now: DateTime<Utc>) -> Vec<ListedTask> {
    tasks.sort_by(|a, b| compare_for_listing(a, b, now));
    tasks
        .into_iter()
        .map(|task| ListedTask::at(task, now))
        .collect()
}

/// Orders trashed tasks, most recently deleted first.
#[must_use]
pub fn compare_for_trash(a: &Task, b: &Task) -> Ordering {
    Reverse(a.deleted_at())
        .cmp(&Reverse(b.deleted_at()))
        .then_with(|| a.id().cmp(&b.id()))
}

/// Sorts trashed tasks into trash order.
pub fn sort_for_trash(tasks: &mut [Task]) {
    tasks.sort_by(compare_for_trash);
}

// `None` sorts last, unlike the derived `Option` order.
fn compare_deadlines(a: &Task, b: &Task) -> Ordering {
    match (a.due_at(), b.due_at()) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
