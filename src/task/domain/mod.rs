//! Domain model for the task lifecycle.
//!
//! The task domain owns status derivation, listing order and the
//! active/trash state machine while keeping all infrastructure concerns
//! outside of the domain boundary.

mod content;
mod due;
mod error;
mod ids;
mod listing;
mod status;
mod summary;
mod task;

pub use content::{MAX_TITLE_LENGTH, TaskDescription, TaskTitle};
pub use due::DueDateTime;
pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::{TaskId, TaskIdSet, UserId};
pub use listing::{
    ListedTask, compare_for_listing, compare_for_trash, sort_for_listing, sort_for_trash,
};
pub use status::{TaskStatus, derive_status};
pub use summary::{RECENT_TASK_LIMIT, TaskSummary};
pub use task::{NewTaskData, PersistedTaskData, Task, TaskEdit, TaskTransition};
