//! `PostgreSQL` integration tests for repository-level guarantees.

use super::helpers::{TaskTestContext, context};
use crate::test_helpers::{BoxError, TestClock, reference_instant};
use chrono::Duration;
use rstest::rstest;
use taskkeeper::task::{
    domain::{
        DueDateTime, NewTaskData, Task, TaskDescription, TaskEdit, TaskIdSet, TaskTitle,
        TaskTransition, UserId,
    },
    ports::{TaskRepository, TaskRepositoryError},
};

fn unsaved_task(owner: UserId, title: &str) -> Result<Task, BoxError> {
    let clock = TestClock::at(reference_instant());
    Ok(Task::new(
        NewTaskData {
            owner,
            title: TaskTitle::new(title)?,
            description: TaskDescription::new("repository fixture")?,
            due_at: Some(DueDateTime::from_utc(reference_instant() + Duration::hours(1))),
        },
        &clock,
    ))
}

#[rstest]
fn postgres_duplicate_identifier_is_rejected(
    context: Result<TaskTestContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    ctx.block_on(async {
        let task = unsaved_task(ctx.owner, "once")?;

        ctx.repository.store(&task).await?;
        let result = ctx.repository.store(&task).await;

        assert!(matches!(
            result,
            Err(TaskRepositoryError::DuplicateTask(id)) if id == task.id()
        ));
        Ok::<(), BoxError>(())
    })
}

#[rstest]
fn postgres_transition_of_missing_task_counts_zero(
    context: Result<TaskTestContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    ctx.block_on(async {
        let ghost = unsaved_task(ctx.owner, "ghost")?;

        let changed = ctx
            .repository
            .apply_transition(
                ctx.owner,
                &TaskIdSet::single(ghost.id()),
                TaskTransition::Complete,
                reference_instant(),
            )
            .await?;

        assert_eq!(changed, 0);
        Ok::<(), BoxError>(())
    })
}

#[rstest]
fn postgres_complete_leaves_trashed_rows_in_the_trash(
    context: Result<TaskTestContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    ctx.block_on(async {
        let task = unsaved_task(ctx.owner, "binned")?;
        ctx.repository.store(&task).await?;
        let selected = TaskIdSet::single(task.id());
        let later = reference_instant() + Duration::minutes(5);

        let trashed = ctx
            .repository
            .apply_transition(ctx.owner, &selected, TaskTransition::SoftDelete, later)
            .await?;
        let completed = ctx
            .repository
            .apply_transition(ctx.owner, &selected, TaskTransition::Complete, later)
            .await?;

        assert_eq!((trashed, completed), (1, 0));
        let stored = ctx
            .repository
            .find_by_id(ctx.owner, task.id())
            .await?
            .ok_or("task should exist")?;
        assert_eq!(stored.deleted_at(), Some(later));
        assert!(!stored.is_completed());
        Ok::<(), BoxError>(())
    })
}

#[rstest]
fn postgres_reopen_and_restore_recompute_overdue(
    context: Result<TaskTestContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    ctx.block_on(async {
        let task = unsaved_task(ctx.owner, "slipping")?;
        ctx.repository.store(&task).await?;
        let selected = TaskIdSet::single(task.id());
        let past_due = reference_instant() + Duration::hours(2);

        for transition in [
            TaskTransition::Complete,
            TaskTransition::MarkIncomplete,
            TaskTransition::SoftDelete,
            TaskTransition::Restore,
        ] {
            let changed = ctx
                .repository
                .apply_transition(ctx.owner, &selected, transition, past_due)
                .await?;
            assert_eq!(changed, 1, "{} should apply", transition.name());
        }

        let stored = ctx
            .repository
            .find_by_id(ctx.owner, task.id())
            .await?
            .ok_or("task should exist")?;
        assert!(stored.is_active());
        assert!(!stored.is_completed());
        assert!(stored.overdue_flag());
        assert_eq!(stored.updated_at(), past_due);
        Ok::<(), BoxError>(())
    })
}

#[rstest]
fn postgres_writes_are_scoped_by_owner(
    context: Result<TaskTestContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    ctx.block_on(async {
        let stranger = UserId::new();
        let mine = unsaved_task(ctx.owner, "mine")?;
        let theirs = unsaved_task(stranger, "theirs")?;
        ctx.repository.store(&mine).await?;
        ctx.repository.store(&theirs).await?;
        let both = TaskIdSet::new([mine.id(), theirs.id()])?;

        let changed = ctx
            .repository
            .apply_transition(ctx.owner, &both, TaskTransition::Complete, reference_instant())
            .await?;

        assert_eq!(changed, 1);
        assert!(ctx.repository.find_by_id(ctx.owner, theirs.id()).await?.is_none());
        assert_eq!(ctx.repository.list_active(stranger).await?, vec![theirs]);
        Ok::<(), BoxError>(())
    })
}

#[rstest]
fn postgres_edit_skips_trashed_rows(
    context: Result<TaskTestContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    ctx.block_on(async {
        let task = unsaved_task(ctx.owner, "binned")?;
        ctx.repository.store(&task).await?;
        ctx.repository
            .apply_transition(
                ctx.owner,
                &TaskIdSet::single(task.id()),
                TaskTransition::SoftDelete,
                reference_instant(),
            )
            .await?;
        let edit = TaskEdit {
            title: TaskTitle::new("revived")?,
            description: TaskDescription::new("should not land")?,
            due_at: None,
        };

        let edited = ctx
            .repository
            .apply_edit(ctx.owner, task.id(), &edit, reference_instant())
            .await?;

        assert!(edited.is_none());
        let stored = ctx
            .repository
            .find_by_id(ctx.owner, task.id())
            .await?
            .ok_or("task should exist")?;
        assert_eq!(stored.title().as_str(), "binned");
        assert!(!stored.is_active());
        Ok::<(), BoxError>(())
    })
}

#[rstest]
fn postgres_delete_trashed_leaves_active_rows(
    context: Result<TaskTestContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    ctx.block_on(async {
        let active = unsaved_task(ctx.owner, "active")?;
        let trashed = unsaved_task(ctx.owner, "trashed")?;
        ctx.repository.store(&active).await?;
        ctx.repository.store(&trashed).await?;
        ctx.repository
            .apply_transition(
                ctx.owner,
                &TaskIdSet::single(trashed.id()),
                TaskTransition::SoftDelete,
                reference_instant(),
            )
            .await?;

        let removed = ctx
            .repository
            .delete_trashed(ctx.owner, &TaskIdSet::new([active.id(), trashed.id()])?)
            .await?;

        assert_eq!(removed, 1);
        assert_eq!(ctx.repository.list_active(ctx.owner).await?, vec![active]);
        assert!(ctx.repository.list_trash(ctx.owner).await?.is_empty());
        Ok::<(), BoxError>(())
    })
}
