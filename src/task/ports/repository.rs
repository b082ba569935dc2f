//! Repository port for task persistence and lifecycle queries.

use crate::task::domain::{Task, TaskEdit, TaskId, TaskIdSet, TaskTransition, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Set of tasks covered by an overdue sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepScope {
    /// Only the tasks owned by one user.
    User(UserId),
    /// Every task in the store.
    All,
}

impl SweepScope {
    /// Returns whether a task owned by `owner` falls inside this scope.
    #[must_use]
    pub fn covers(self, owner: UserId) -> bool {
        match self {
            Self::User(user) => user == owner,
            Self::All => true,
        }
    }
}

/// Task persistence contract.
///
/// Every lookup and mutation except [`TaskRepository::sweep_overdue`] with
/// [`SweepScope::All`] is scoped by the owning user. Tasks belonging to
/// another user behave exactly like missing ones.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Applies `transition` at `now` to the tasks of `owner` in `ids`.
    ///
    /// Only tasks currently in the source state of the transition change;
    /// the state check and the write form one atomic step, so a concurrent
    /// change is never overwritten. Unknown identifiers count as unchanged.
    ///
    /// Returns the number of tasks that changed.
    async fn apply_transition(
        &self,
        owner: UserId,
        ids: &TaskIdSet,
        transition: TaskTransition,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<usize>;

    /// Overwrites the editable fields of an active task of `owner` at `now`.
    ///
    /// Returns the edited task, or `None` when no active task of `owner`
    /// matches `id`.
    async fn apply_edit(
        &self,
        owner: UserId,
        id: TaskId,
        edit: &TaskEdit,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<Option<Task>>;

    /// Finds a task of `owner` by identifier, active or trashed.
    ///
    /// Returns `None` when the task does not exist or belongs to someone else.
    async fn find_by_id(&self, owner: UserId, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns all active tasks of `owner`, in no particular order.
    async fn list_active(&self, owner: UserId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns all trashed tasks of `owner`, most recently deleted first.
    async fn list_trash(&self, owner: UserId) -> TaskRepositoryResult<Vec<Task>>;

    /// Refreshes the cached overdue flag of active tasks in `scope` at `now`.
    ///
    /// Returns the number of tasks whose flag changed. Running the sweep
    /// twice with the same `now` changes nothing the second time.
    async fn sweep_overdue(&self, scope: SweepScope, now: DateTime<Utc>)
    -> TaskRepositoryResult<usize>;

    /// Physically removes trashed tasks of `owner` whose identifiers are in
    /// `ids`. Active tasks are left alone.
    ///
    /// Returns the number of removed tasks.
    async fn delete_trashed(&self, owner: UserId, ids: &TaskIdSet) -> TaskRepositoryResult<usize>;

    /// Physically removes every trashed task of `owner`.
    ///
    /// Returns the number of removed tasks.
    async fn empty_trash(&self, owner: UserId) -> TaskRepositoryResult<usize>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
