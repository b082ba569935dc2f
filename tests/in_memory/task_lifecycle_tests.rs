//! In-memory integration tests for task lifecycle operations.

use super::helpers::{Workspace, create_for, workspace};
use chrono::Duration;
use eyre::ensure;
use rstest::rstest;
use taskkeeper::task::{
    domain::{TaskDomainError, TaskId, TaskIdSet, TaskStatus, UserId},
    services::{CreateTaskRequest, TaskLifecycleError, UpdateTaskRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_task_is_listed_as_pending(workspace: Workspace) -> eyre::Result<()> {
    let created = workspace
        .service
        .create(
            CreateTaskRequest::new(workspace.owner, "File taxes", "Before April", "2026-03-31")
                .with_due_time("17:00"),
        )
        .await?;

    let listing = workspace.service.list_active(workspace.owner).await?;

    ensure!(listing.len() == 1, "expected one task, found {}", listing.len());
    let entry = listing
        .first()
        .ok_or_else(|| eyre::eyre!("listing should not be empty"))?;
    ensure!(entry.task == created);
    ensure!(entry.status == TaskStatus::Pending);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_time_is_a_validation_error(workspace: Workspace) -> eyre::Result<()> {
    let result = workspace
        .service
        .create(
            CreateTaskRequest::new(workspace.owner, "Call bank", "Card blocked", "2026-03-11")
                .with_due_time("half past nine"),
        )
        .await;

    let Err(err) = result else {
        eyre::bail!("malformed time should be rejected");
    };
    ensure!(err.is_validation());
    ensure!(matches!(
        err,
        TaskLifecycleError::Domain(TaskDomainError::InvalidDueTime(_))
    ));
    ensure!(workspace.service.list_active(workspace.owner).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_trash_cycle(workspace: Workspace) -> eyre::Result<()> {
    let task = workspace.create_due_in("cycle", Duration::hours(4)).await?;
    let id = task.id();

    ensure!(workspace.service.complete(workspace.owner, id).await?);
    ensure!(workspace.service.soft_delete(workspace.owner, id).await?);
    ensure!(workspace.service.list_active(workspace.owner).await?.is_empty());

    let trash = workspace.service.list_trash(workspace.owner).await?;
    ensure!(trash.iter().any(|entry| entry.id() == id));

    ensure!(workspace.service.restore(workspace.owner, id).await?);
    let restored = workspace.service.find_by_id(workspace.owner, id).await?;
    ensure!(restored.status == TaskStatus::Completed, "completion survives the trash");

    ensure!(workspace.service.soft_delete(workspace.owner, id).await?);
    ensure!(workspace.service.permanently_delete(workspace.owner, id).await?);
    ensure!(matches!(
        workspace.service.find_by_id(workspace.owner, id).await,
        Err(TaskLifecycleError::NotFound(missing)) if missing == id
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bulk_operations_report_affected_counts(workspace: Workspace) -> eyre::Result<()> {
    let mut ids = Vec::new();
    for hour in 1..=3 {
        ids.push(
            workspace
                .create_due_in(&format!("task {hour}"), Duration::hours(hour))
                .await?
                .id(),
        );
    }
    let selection = TaskIdSet::new(ids.iter().copied().chain([TaskId::new()]))?;

    ensure!(workspace.service.bulk_complete(workspace.owner, &selection).await? == 3);
    ensure!(workspace.service.bulk_complete(workspace.owner, &selection).await? == 0);
    ensure!(workspace.service.bulk_soft_delete(workspace.owner, &selection).await? == 3);
    ensure!(
        workspace
            .service
            .bulk_permanently_delete(workspace.owner, &selection)
            .await?
            == 3
    );
    ensure!(workspace.service.list_trash(workspace.owner).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn raw_selection_is_parsed_before_bulk_restore(workspace: Workspace) -> eyre::Result<()> {
    let task = workspace.create_due_in("binned", Duration::hours(1)).await?;
    ensure!(workspace.service.soft_delete(workspace.owner, task.id()).await?);

    let selection = TaskIdSet::parse([task.id().to_string(), "  ".to_owned()])?;

    ensure!(workspace.service.bulk_restore(workspace.owner, &selection).await? == 1);
    ensure!(workspace.service.list_trash(workspace.owner).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn users_cannot_see_or_change_each_other(workspace: Workspace) -> eyre::Result<()> {
    let neighbour = UserId::new();
    let mine = workspace.create_due_in("mine", Duration::hours(1)).await?;
    let theirs = create_for(&workspace.service, neighbour, "theirs", Duration::hours(1)).await?;

    let listing = workspace.service.list_active(workspace.owner).await?;
    ensure!(listing.iter().all(|entry| entry.task.owner() == workspace.owner));
    ensure!(!workspace.service.complete(workspace.owner, theirs.id()).await?);
    ensure!(
        workspace
            .service
            .update(UpdateTaskRequest::new(workspace.owner, theirs.id(), "mine now", "no"))
            .await?
            .is_none()
    );

    ensure!(workspace.service.soft_delete(workspace.owner, mine.id()).await?);
    ensure!(workspace.service.soft_delete(neighbour, theirs.id()).await?);
    ensure!(workspace.service.empty_trash(neighbour).await? == 1);
    ensure!(workspace.service.list_trash(workspace.owner).await?.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reopening_a_late_task_makes_it_overdue(workspace: Workspace) -> eyre::Result<()> {
    let task = workspace.create_due_in("late", Duration::minutes(15)).await?;
    ensure!(workspace.service.complete(workspace.owner, task.id()).await?);
    workspace.clock.advance(Duration::hours(1));

    ensure!(workspace.service.mark_incomplete(workspace.owner, task.id()).await?);

    let entry = workspace.service.find_by_id(workspace.owner, task.id()).await?;
    ensure!(entry.status == TaskStatus::Overdue);
    ensure!(entry.task.overdue_flag());
    Ok(())
}
