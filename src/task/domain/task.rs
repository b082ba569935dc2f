//! Task aggregate root and its lifecycle transitions.

use super::{
    DueDateTime, TaskDescription, TaskId, TaskStatus, TaskTitle, UserId, derive_status,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Task aggregate root.
///
/// A task is either active or in the trash (`deleted_at` set). Completion and
/// trash membership are independent: a task can be trashed at any status.
/// Every transition method reports whether stored state changed, so that
/// re-applying a transition is a successful no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    owner: UserId,
    title: TaskTitle,
    description: TaskDescription,
    due_at: Option<DueDateTime>,
    completed: bool,
    overdue: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskData {
    /// Owning user.
    pub owner: UserId,
    /// Validated title.
    pub title: TaskTitle,
    /// Validated description.
    pub description: TaskDescription,
    /// Optional deadline.
    pub due_at: Option<DueDateTime>,
}

/// Replacement values applied by [`Task::apply_edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEdit {
    /// New title.
    pub title: TaskTitle,
    /// New description.
    pub description: TaskDescription,
    /// New deadline; `None` clears it.
    pub due_at: Option<DueDateTime>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owner.
    pub owner: UserId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description.
    pub description: TaskDescription,
    /// Persisted deadline, if any.
    pub due_at: Option<DueDateTime>,
    /// Persisted completion flag.
    pub completed: bool,
    /// Cached overdue flag as last swept.
    pub overdue: bool,
    /// Soft-deletion timestamp, if trashed.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new active, open task.
    #[must_use]
    pub fn new(data: NewTaskData, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let overdue = data.due_at.is_some_and(|due| due.is_past(timestamp));

        Self {
            id: TaskId::new(),
            owner: data.owner,
            title: data.title,
            description: data.description,
            due_at: data.due_at,
            completed: false,
            overdue,
            deleted_at: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            owner: data.owner,
            title: data.title,
            description: data.description,
            due_at: data.due_at,
            completed: data.completed,
            overdue: data.overdue,
            deleted_at: data.deleted_at,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub const fn description(&self) -> &TaskDescription {
        &self.description
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn due_at(&self) -> Option<DueDateTime> {
        self.due_at
    }

    /// Returns the completion flag.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Returns the cached overdue flag.
    ///
    /// Only meaningful right after a sweep; use [`Task::status`] for display.
    #[must_use]
    pub const fn overdue_flag(&self) -> bool {
        self.overdue
    }

    /// Returns the soft-deletion timestamp, if the task is in the trash.
    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns whether the task is active (not in the trash).
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Derives the status of this task at `now`.
    #[must_use]
    pub fn status(&self, now: DateTime<Utc>) -> TaskStatus {
        derive_status(self.completed, self.due_at, now)
    }

    /// Recomputes the cached overdue flag against `now`.
    ///
    /// Trashed tasks are left untouched. Returns whether the flag changed.
    pub fn refresh_overdue(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_active() {
            return false;
        }
        let overdue = self.status(now) == TaskStatus::Overdue;
        if overdue == self.overdue {
            return false;
        }
        self.overdue = overdue;
        true
    }

    /// Applies `transition` at `now` if the task is in its source state.
    ///
    /// Returns whether the task changed.
    pub fn apply(&mut self, transition: TaskTransition, now: DateTime<Utc>) -> bool {
        if !transition.applies_to(self) {
            return false;
        }
        match transition {
            TaskTransition::Complete => {
                self.completed = true;
                self.overdue = false;
            }
            TaskTransition::MarkIncomplete => self.completed = false,
            TaskTransition::SoftDelete => self.deleted_at = Some(now),
            TaskTransition::Restore => self.deleted_at = None,
        }
        self.updated_at = now;
        if matches!(
            transition,
            TaskTransition::MarkIncomplete | TaskTransition::Restore
        ) {
            self.refresh_overdue(now);
        }
        true
    }

    /// Overwrites the editable fields at `now` if the task is active.
    pub fn apply_edit(&mut self, edit: TaskEdit, now: DateTime<Utc>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.title = edit.title;
        self.description = edit.description;
        self.due_at = edit.due_at;
        self.updated_at = now;
        self.refresh_overdue(now);
        true
    }
}

/// State change applied to a selection of tasks.
///
/// Each transition only touches tasks in its source state, so applying it to
/// a task that already reached the target state changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskTransition {
    /// Active and open to completed.
    Complete,
    /// Active and completed back to open.
    MarkIncomplete,
    /// Active to trashed.
    SoftDelete,
    /// Trashed to active.
    Restore,
}

impl TaskTransition {
    /// Returns whether `task` is in the source state of this transition.
    #[must_use]
    pub const fn applies_to(self, task: &Task) -> bool {
        match self {
            Self::Complete => task.is_active() && !task.completed,
            Self::MarkIncomplete => task.is_active() && task.completed,
            Self::SoftDelete => task.is_active(),
            Self::Restore => !task.is_active(),
        }
    }

    /// Returns the operation name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::MarkIncomplete => "mark_incomplete",
            Self::SoftDelete => "soft_delete",
            Self::Restore => "restore",
        }
    }
}
