//! Service layer for task creation, listing and lifecycle transitions.

use crate::task::{
    domain::{
        DueDateTime, ListedTask, NewTaskData, Task, TaskDescription, TaskDomainError, TaskEdit,
        TaskId, TaskIdSet, TaskSummary, TaskTitle, TaskTransition, UserId, sort_for_listing,
    },
    ports::{SweepScope, TaskRepository, TaskRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Request payload for creating a task.
///
/// Fields arrive as raw strings from the request layer; validation happens in
/// [`TaskLifecycleService::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    owner: UserId,
    title: String,
    description: String,
    due_date: String,
    due_time: Option<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(
        owner: UserId,
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: impl Into<String>,
    ) -> Self {
        Self {
            owner,
            title: title.into(),
            description: description.into(),
            due_date: due_date.into(),
            due_time: None,
        }
    }

    /// Sets the due time; without it the deadline is the end of the due day.
    #[must_use]
    pub fn with_due_time(mut self, due_time: impl Into<String>) -> Self {
        self.due_time = Some(due_time.into());
        self
    }
}

/// Request payload for editing an active task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    owner: UserId,
    task_id: TaskId,
    title: String,
    description: String,
    due_date: Option<String>,
    due_time: Option<String>,
}

impl UpdateTaskRequest {
    /// Creates a request that replaces title and description and clears the
    /// deadline unless [`UpdateTaskRequest::with_due_date`] is used.
    #[must_use]
    pub fn new(
        owner: UserId,
        task_id: TaskId,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            owner,
            task_id,
            title: title.into(),
            description: description.into(),
            due_date: None,
            due_time: None,
        }
    }

    /// Sets the due date.
    #[must_use]
    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    /// Sets the due time.
    #[must_use]
    pub fn with_due_time(mut self, due_time: impl Into<String>) -> Self {
        self.due_time = Some(due_time.into());
        self
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// The requested task does not exist for this user.
    #[error("task not found: {0}")]
    NotFound(TaskId),
}

impl TaskLifecycleError {
    /// Returns whether the error stems from user input rather than a fault.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Domain(_))
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Every operation takes the acting user explicitly. Tasks owned by someone
/// else are treated exactly like missing tasks.
#[derive(Clone)]
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates a task for its owner.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when a field is missing or
    /// malformed or the deadline is in the past; nothing is stored then.
    /// Returns [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn create(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let now = self.clock.utc();
        let title = TaskTitle::new(&request.title)?;
        let description = TaskDescription::new(&request.description)?;
        let due_at = DueDateTime::from_parts(&request.due_date, request.due_time.as_deref())?
            .ensure_not_past(now)?;

        let task = Task::new(
            NewTaskData {
                owner: request.owner,
                title,
                description,
                due_at: Some(due_at),
            },
            &*self.clock,
        );
        self.repository.store(&task).await?;
        info!(user_id = %task.owner(), task_id = %task.id(), due_at = %due_at, "task created");
        Ok(task)
    }

    /// Replaces the title, description and deadline of an active task.
    ///
    /// Returns `Ok(None)` when no active task of the owner matches.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for invalid input, checked
    /// before the store is touched, or [`TaskLifecycleError::Repository`]
    /// when persistence fails.
    pub async fn update(&self, request: UpdateTaskRequest) -> TaskLifecycleResult<Option<Task>> {
        let now = self.clock.utc();
        let edit = TaskEdit {
            title: TaskTitle::new(&request.title)?,
            description: TaskDescription::new(&request.description)?,
            due_at: optional_due(
                request.due_date.as_deref(),
                request.due_time.as_deref(),
                now,
            )?,
        };

        let updated = self
            .repository
            .apply_edit(request.owner, request.task_id, &edit, now)
            .await?;
        match &updated {
            Some(task) => info!(user_id = %task.owner(), task_id = %task.id(), "task updated"),
            None => {
                debug!(user_id = %request.owner, task_id = %request.task_id, "no active task to update");
            }
        }
        Ok(updated)
    }

    /// Reads one task of the owner, active or trashed, with its status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist
    /// for this owner, or [`TaskLifecycleError::Repository`] when lookup
    /// fails.
    pub async fn find_by_id(&self, owner: UserId, id: TaskId) -> TaskLifecycleResult<ListedTask> {
        let task = self
            .repository
            .find_by_id(owner, id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(id))?;
        Ok(ListedTask::at(task, self.clock.utc()))
    }

    /// Lists the active tasks of the owner in display order.
    ///
    /// The overdue sweep runs first; if it fails the listing is abandoned.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the sweep or the
    /// lookup fails.
    pub async fn list_active(&self, owner: UserId) -> TaskLifecycleResult<Vec<ListedTask>> {
        let now = self.clock.utc();
        self.sweep_at(SweepScope::User(owner), now).await?;
        let tasks = self.repository.list_active(owner).await?;
        debug!(user_id = %owner, count = tasks.len(), "listed active tasks");
        Ok(sort_for_listing(tasks, now))
    }

    /// Lists the trashed tasks of the owner, most recently deleted first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn list_trash(&self, owner: UserId) -> TaskLifecycleResult<Vec<Task>> {
        let tasks = self.repository.list_trash(owner).await?;
        debug!(user_id = %owner, count = tasks.len(), "listed trash");
        Ok(tasks)
    }

    /// Counts the owner's active tasks per status and returns the head of
    /// the listing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the listing fails.
    pub async fn summarize(&self, owner: UserId) -> TaskLifecycleResult<TaskSummary> {
        let listing = self.list_active(owner).await?;
        Ok(TaskSummary::from_listing(&listing))
    }

    /// Refreshes cached overdue flags in `scope` against the current clock.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the store is
    /// unavailable.
    pub async fn sweep_overdue(&self, scope: SweepScope) -> TaskLifecycleResult<usize> {
        self.sweep_at(scope, self.clock.utc()).await
    }

    /// Marks a task as completed. Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn complete(&self, owner: UserId, id: TaskId) -> TaskLifecycleResult<bool> {
        self.transition_one(owner, id, TaskTransition::Complete).await
    }

    /// Reopens a completed task. Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn mark_incomplete(&self, owner: UserId, id: TaskId) -> TaskLifecycleResult<bool> {
        self.transition_one(owner, id, TaskTransition::MarkIncomplete)
            .await
    }

    /// Moves a task to the trash. Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn soft_delete(&self, owner: UserId, id: TaskId) -> TaskLifecycleResult<bool> {
        self.transition_one(owner, id, TaskTransition::SoftDelete).await
    }

    /// Takes a task out of the trash. Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn restore(&self, owner: UserId, id: TaskId) -> TaskLifecycleResult<bool> {
        self.transition_one(owner, id, TaskTransition::Restore).await
    }

    /// Physically removes a trashed task. Returns whether a task was removed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn permanently_delete(&self, owner: UserId, id: TaskId) -> TaskLifecycleResult<bool> {
        let removed = self
            .bulk_permanently_delete(owner, &TaskIdSet::single(id))
            .await?;
        Ok(removed > 0)
    }

    /// Completes every selected task. Returns the number of changed tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn bulk_complete(&self, owner: UserId, ids: &TaskIdSet) -> TaskLifecycleResult<usize> {
        self.transition_many(owner, ids, TaskTransition::Complete).await
    }

    /// Reopens every selected task. Returns the number of changed tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn bulk_mark_incomplete(
        &self,
        owner: UserId,
        ids: &TaskIdSet,
    ) -> TaskLifecycleResult<usize> {
        self.transition_many(owner, ids, TaskTransition::MarkIncomplete)
            .await
    }

    /// Trashes every selected task. Returns the number of changed tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn bulk_soft_delete(
        &self,
        owner: UserId,
        ids: &TaskIdSet,
    ) -> TaskLifecycleResult<usize> {
        self.transition_many(owner, ids, TaskTransition::SoftDelete).await
    }

    /// Restores every selected task. Returns the number of changed tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn bulk_restore(&self, owner: UserId, ids: &TaskIdSet) -> TaskLifecycleResult<usize> {
        self.transition_many(owner, ids, TaskTransition::Restore).await
    }

    /// Physically removes every selected task that is in the trash.
    ///
    /// Active tasks in the selection are left alone. Returns the number of
    /// removed tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn bulk_permanently_delete(
        &self,
        owner: UserId,
        ids: &TaskIdSet,
    ) -> TaskLifecycleResult<usize> {
        let removed = self.repository.delete_trashed(owner, ids).await?;
        log_batch(owner, "permanently_delete", ids.len(), removed);
        Ok(removed)
    }

    /// Physically removes all trashed tasks of the owner.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn empty_trash(&self, owner: UserId) -> TaskLifecycleResult<usize> {
        let removed = self.repository.empty_trash(owner).await?;
        info!(user_id = %owner, removed, "trash emptied");
        Ok(removed)
    }

    async fn sweep_at(&self, scope: SweepScope, now: DateTime<Utc>) -> TaskLifecycleResult<usize> {
        let changed = self.repository.sweep_overdue(scope, now).await?;
        debug!(?scope, changed, "overdue sweep finished");
        Ok(changed)
    }

    async fn transition_one(
        &self,
        owner: UserId,
        id: TaskId,
        transition: TaskTransition,
    ) -> TaskLifecycleResult<bool> {
        let changed = self
            .transition_many(owner, &TaskIdSet::single(id), transition)
            .await?;
        Ok(changed > 0)
    }

    async fn transition_many(
        &self,
        owner: UserId,
        ids: &TaskIdSet,
        transition: TaskTransition,
    ) -> TaskLifecycleResult<usize> {
        let changed = self
            .repository
            .apply_transition(owner, ids, transition, self.clock.utc())
            .await?;
        log_batch(owner, transition.name(), ids.len(), changed);
        Ok(changed)
    }
}

fn log_batch(owner: UserId, operation: &'static str, requested: usize, affected: usize) {
    if affected == 0 {
        debug!(user_id = %owner, operation, requested, "no task changed");
    } else {
        info!(user_id = %owner, operation, requested, affected, "tasks transitioned");
    }
}

fn optional_due(
    date: Option<&str>,
    time: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Option<DueDateTime>, TaskDomainError> {
    let has_time = time.is_some_and(|value| !value.trim().is_empty());
    match date.filter(|value| !value.trim().is_empty()) {
        Some(day) => Ok(Some(DueDateTime::from_parts(day, time)?.ensure_not_past(now)?)),
        None if has_time => Err(TaskDomainError::MissingDueDate),
        None => Ok(None),
    }
}
