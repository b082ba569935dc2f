//! Shared fixtures for `PostgreSQL` integration tests.

use super::database::TemporaryDatabase;
use crate::test_helpers::{BoxError, TestClock, due_parts, reference_instant};
use chrono::Duration;
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::fixture;
use std::future::Future;
use std::sync::Arc;
use taskkeeper::task::{
    adapters::postgres::{PostgresTaskRepository, TaskPgPool},
    domain::{Task, UserId},
    services::{CreateTaskRequest, TaskLifecycleService},
};
use tokio::runtime::Runtime;

/// Repository, service and database for one test.
///
/// Field order matters: the pool must be gone before the database is
/// dropped.
pub struct TaskTestContext {
    /// Repository under test.
    pub repository: Arc<PostgresTaskRepository>,
    /// Service wired to the repository.
    pub service: TaskLifecycleService<PostgresTaskRepository, TestClock>,
    /// Shared pinned clock.
    pub clock: Arc<TestClock>,
    /// Acting user.
    pub owner: UserId,
    runtime: Runtime,
    _database: TemporaryDatabase,
}

impl TaskTestContext {
    /// Drives `future` to completion on the context's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Creates a task for `owner` due `offset` after the reference instant.
    ///
    /// # Errors
    ///
    /// Returns an error if creation fails.
    pub async fn create_for(
        &self,
        owner: UserId,
        title: &str,
        offset: Duration,
    ) -> Result<Task, BoxError> {
        let (date, time) = due_parts(reference_instant() + offset);
        let task = self
            .service
            .create(CreateTaskRequest::new(owner, title, "stored in postgres", date).with_due_time(time))
            .await?;
        Ok(task)
    }

    /// Creates a task for the acting user.
    ///
    /// # Errors
    ///
    /// Returns an error if creation fails.
    pub async fn create_due_in(&self, title: &str, offset: Duration) -> Result<Task, BoxError> {
        self.create_for(self.owner, title, offset).await
    }
}

/// Creates a current-thread runtime for driving repository calls.
fn test_runtime() -> Result<Runtime, BoxError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Box::new(e) as BoxError)
}

/// Provides a context backed by a fresh database cloned from the migrated
/// template on the shared embedded cluster.
///
/// # Errors
///
/// Returns an error if database, pool or runtime setup fails.
#[fixture]
pub fn context(shared_test_cluster: &'static TestCluster) -> Result<TaskTestContext, BoxError> {
    let database = TemporaryDatabase::from_template(shared_test_cluster)?;
    let manager = ConnectionManager::<PgConnection>::new(database.url());
    let pool: TaskPgPool = Pool::builder()
        .max_size(2)
        .build(manager)
        .map_err(|e| Box::new(e) as BoxError)?;
    let repository = Arc::new(PostgresTaskRepository::new(pool));
    let clock = Arc::new(TestClock::at(reference_instant()));
    let service = TaskLifecycleService::new(Arc::clone(&repository), Arc::clone(&clock));
    Ok(TaskTestContext {
        repository,
        service,
        clock,
        owner: UserId::new(),
        runtime: test_runtime()?,
        _database: database,
    })
}
