//! Identifier types for the task domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new random task identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a task identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses a task identifier from its textual form.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTaskId`] when the value is not a
    /// UUID.
    pub fn parse_str(value: &str) -> Result<Self, TaskDomainError> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| TaskDomainError::InvalidTaskId(value.to_owned()))
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for TaskId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the user owning a task.
///
/// Ownership never changes after creation and scopes every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-empty, de-duplicated selection of tasks for bulk operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskIdSet(BTreeSet<TaskId>);

impl TaskIdSet {
    /// Builds a selection from task identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptySelection`] when `ids` yields nothing.
    pub fn new(ids: impl IntoIterator<Item = TaskId>) -> Result<Self, TaskDomainError> {
        let set: BTreeSet<TaskId> = ids.into_iter().collect();
        if set.is_empty() {
            return Err(TaskDomainError::EmptySelection);
        }
        Ok(Self(set))
    }

    /// Builds a selection from raw identifier strings.
    ///
    /// Accepts a single identifier or many, as submitted by a form. Blank
    /// entries are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTaskId`] for a malformed entry and
    /// [`TaskDomainError::EmptySelection`] when nothing remains.
    pub fn parse<I, S>(raw: I) -> Result<Self, TaskDomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = raw
            .into_iter()
            .filter(|value| !value.as_ref().trim().is_empty())
            .map(|value| TaskId::parse_str(value.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(ids)
    }

    /// Creates a single-element selection.
    #[must_use]
    pub fn single(id: TaskId) -> Self {
        Self(BTreeSet::from([id]))
    }

    /// Returns the number of selected tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether `id` is part of the selection.
    #[must_use]
    pub fn contains(&self, id: TaskId) -> bool {
        self.0.contains(&id)
    }

    /// Iterates over the selected identifiers in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.0.iter().copied()
    }

    /// Returns the selection as raw UUIDs.
    #[must_use]
    pub fn to_uuids(&self) -> Vec<Uuid> {
        self.iter().map(TaskId::into_inner).collect()
    }
}
