//! Given steps for task trash lifecycle scenarios.

use super::world::{TrashWorld, run_async};
use crate::test_helpers::{due_parts, reference_instant};
use chrono::Duration;
use eyre::{WrapErr, ensure};
use rstest_bdd_macros::given;
use taskkeeper::task::services::CreateTaskRequest;

#[given(r#"a task "{title}" due in {minutes:i64} minutes"#)]
fn task_due_in(world: &mut TrashWorld, title: String, minutes: i64) -> Result<(), eyre::Report> {
    let (date, time) = due_parts(reference_instant() + Duration::minutes(minutes));
    let request =
        CreateTaskRequest::new(world.owner, title, "scenario task", date).with_due_time(time);
    let created = run_async(world.service.create(request)).wrap_err("create scenario task")?;
    world.task = Some(created);
    Ok(())
}

#[given("the task is completed")]
fn task_is_completed(world: &mut TrashWorld) -> Result<(), eyre::Report> {
    let id = world.task()?.id();
    let changed = run_async(world.service.complete(world.owner, id)).wrap_err("complete task")?;
    ensure!(changed, "task should change when completed");
    Ok(())
}

#[given("the task is in the trash")]
fn task_is_in_trash(world: &mut TrashWorld) -> Result<(), eyre::Report> {
    let id = world.task()?.id();
    let changed = run_async(world.service.soft_delete(world.owner, id)).wrap_err("trash task")?;
    ensure!(changed, "task should change when trashed");
    Ok(())
}

#[given("{hours:i64} hours pass")]
fn hours_pass(world: &mut TrashWorld, hours: i64) {
    world.clock.advance(Duration::hours(hours));
}
