//! In-memory task repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{Task, TaskEdit, TaskId, TaskIdSet, TaskTransition, UserId, sort_for_trash},
    ports::{SweepScope, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
}

impl InMemoryTaskState {
    fn owned_by(&self, owner: UserId) -> impl Iterator<Item = &Task> {
        self.tasks.values().filter(move |task| task.owner() == owner)
    }

    fn owned_mut(&mut self, owner: UserId, id: TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(&id).filter(|task| task.owner() == owner)
    }

    fn remove_trashed_where(&mut self, predicate: impl Fn(&Task) -> bool) -> usize {
        let before = self.tasks.len();
        self.tasks
            .retain(|_, task| task.is_active() || !predicate(task));
        before - self.tasks.len()
    }
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn apply_transition(
        &self,
        owner: UserId,
        ids: &TaskIdSet,
        transition: TaskTransition,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<usize> {
        let mut state = self.write()?;
        let mut changed = 0;
        for id in ids.iter() {
            if state
                .owned_mut(owner, id)
                .is_some_and(|task| task.apply(transition, now))
            {
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn apply_edit(
        &self,
        owner: UserId,
        id: TaskId,
        edit: &TaskEdit,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<Option<Task>> {
        let mut state = self.write()?;
        let Some(task) = state.owned_mut(owner, id) else {
            return Ok(None);
        };
        Ok(task.apply_edit(edit.clone(), now).then(|| task.clone()))
    }

    async fn find_by_id(&self, owner: UserId, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state
            .tasks
            .get(&id)
            .filter(|task| task.owner() == owner)
            .cloned())
    }

    async fn list_active(&self, owner: UserId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state
            .owned_by(owner)
            .filter(|task| task.is_active())
            .cloned()
            .collect())
    }

    async fn list_trash(&self, owner: UserId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let mut trashed: Vec<Task> = state
            .owned_by(owner)
            .filter(|task| !task.is_active())
            .cloned()
            .collect();
        sort_for_trash(&mut trashed);
        Ok(trashed)
    }

    async fn sweep_overdue(
        &self,
        scope: SweepScope,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<usize> {
        let mut state = self.write()?;
        let changed = state
            .tasks
            .values_mut()
            .filter(|task| scope.covers(task.owner()))
            .map(|task| task.refresh_overdue(now))
            .filter(|changed| *changed)
            .count();
        Ok(changed)
    }

    async fn delete_trashed(&self, owner: UserId, ids: &TaskIdSet) -> TaskRepositoryResult<usize> {
        let mut state = self.write()?;
        Ok(state.remove_trashed_where(|task| task.owner() == owner && ids.contains(task.id())))
    }

    async fn empty_trash(&self, owner: UserId) -> TaskRepositoryResult<usize> {
        let mut state = self.write()?;
        Ok(state.remove_trashed_where(|task| task.owner() == owner))
    }
}
