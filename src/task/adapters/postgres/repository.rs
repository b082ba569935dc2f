//! `PostgreSQL` repository implementation for task lifecycle storage.

use super::{
    models::{NewTaskRow, TaskRow},
    schema::tasks,
};
use crate::task::{
    domain::{
        DueDateTime, PersistedTaskData, Task, TaskDescription, TaskEdit, TaskId, TaskIdSet,
        TaskTitle, TaskTransition, UserId,
    },
    ports::{SweepScope, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Flips the cached flag of every active row whose flag disagrees with the
/// derivation rule at `$2`. `$1` restricts the sweep to one owner when set.
const SWEEP_OVERDUE_SQL: &str = concat!(
    "UPDATE tasks SET overdue = NOT overdue ",
    "WHERE deleted_at IS NULL ",
    "AND ($1::uuid IS NULL OR user_id = $1) ",
    "AND overdue <> (NOT completed AND COALESCE(due_datetime < $2, FALSE))",
);

// Transition statements bind the owner as `$1`, the selected identifiers as
// `$2` and the transition instant as `$3`. Each only matches rows in the
// source state of its transition.
const COMPLETE_SQL: &str = concat!(
    "UPDATE tasks SET completed = TRUE, overdue = FALSE, updated_at = $3 ",
    "WHERE user_id = $1 AND id = ANY($2) ",
    "AND deleted_at IS NULL AND NOT completed",
);

const MARK_INCOMPLETE_SQL: &str = concat!(
    "UPDATE tasks SET completed = FALSE, ",
    "overdue = COALESCE(due_datetime < $3, FALSE), updated_at = $3 ",
    "WHERE user_id = $1 AND id = ANY($2) ",
    "AND deleted_at IS NULL AND completed",
);

const SOFT_DELETE_SQL: &str = concat!(
    "UPDATE tasks SET deleted_at = $3, updated_at = $3 ",
    "WHERE user_id = $1 AND id = ANY($2) AND deleted_at IS NULL",
);

const RESTORE_SQL: &str = concat!(
    "UPDATE tasks SET deleted_at = NULL, ",
    "overdue = (NOT completed AND COALESCE(due_datetime < $3, FALSE)), updated_at = $3 ",
    "WHERE user_id = $1 AND id = ANY($2) AND deleted_at IS NOT NULL",
);

/// Overwrites the editable fields of one active row and returns it.
///
/// Binds owner `$1`, id `$2`, title `$3`, description `$4`, deadline `$5`
/// and the edit instant `$6`.
const EDIT_ACTIVE_SQL: &str = concat!(
    "UPDATE tasks SET title = $3, description = $4, due_datetime = $5, ",
    "overdue = (NOT completed AND COALESCE($5 < $6, FALSE)), updated_at = $6 ",
    "WHERE user_id = $1 AND id = $2 AND deleted_at IS NULL ",
    "RETURNING id, user_id, title, description, due_datetime, completed, overdue, ",
    "deleted_at, created_at, updated_at",
);

const fn transition_sql(transition: TaskTransition) -> &'static str {
    match transition {
        TaskTransition::Complete => COMPLETE_SQL,
        TaskTransition::MarkIncomplete => MARK_INCOMPLETE_SQL,
        TaskTransition::SoftDelete => SOFT_DELETE_SQL,
        TaskTransition::Restore => RESTORE_SQL,
    }
}

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task);

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn apply_transition(
        &self,
        owner: UserId,
        ids: &TaskIdSet,
        transition: TaskTransition,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<usize> {
        let uuids = ids.to_uuids();
        self.run_blocking(move |connection| {
            diesel::sql_query(transition_sql(transition))
                .bind::<sql_types::Uuid, _>(owner.into_inner())
                .bind::<sql_types::Array<sql_types::Uuid>, _>(uuids)
                .bind::<sql_types::Timestamptz, _>(now)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn apply_edit(
        &self,
        owner: UserId,
        id: TaskId,
        edit: &TaskEdit,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<Option<Task>> {
        let title = edit.title.as_str().to_owned();
        let description = edit.description.as_str().to_owned();
        let due_datetime = edit.due_at.map(DueDateTime::as_datetime);

        self.run_blocking(move |connection| {
            let row = diesel::sql_query(EDIT_ACTIVE_SQL)
                .bind::<sql_types::Uuid, _>(owner.into_inner())
                .bind::<sql_types::Uuid, _>(id.into_inner())
                .bind::<sql_types::Varchar, _>(title)
                .bind::<sql_types::Text, _>(description)
                .bind::<sql_types::Nullable<sql_types::Timestamptz>, _>(due_datetime)
                .bind::<sql_types::Timestamptz, _>(now)
                .get_result::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_id(&self, owner: UserId, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .filter(tasks::user_id.eq(owner.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_active(&self, owner: UserId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::user_id.eq(owner.into_inner()))
                .filter(tasks::deleted_at.is_null())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn list_trash(&self, owner: UserId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::user_id.eq(owner.into_inner()))
                .filter(tasks::deleted_at.is_not_null())
                .order((tasks::deleted_at.desc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn sweep_overdue(
        &self,
        scope: SweepScope,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<usize> {
        let owner = match scope {
            SweepScope::User(user) => Some(user.into_inner()),
            SweepScope::All => None,
        };
        self.run_blocking(move |connection| {
            diesel::sql_query(SWEEP_OVERDUE_SQL)
                .bind::<sql_types::Nullable<sql_types::Uuid>, _>(owner)
                .bind::<sql_types::Timestamptz, _>(now)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn delete_trashed(&self, owner: UserId, ids: &TaskIdSet) -> TaskRepositoryResult<usize> {
        let uuids = ids.to_uuids();
        self.run_blocking(move |connection| {
            diesel::delete(
                tasks::table
                    .filter(tasks::user_id.eq(owner.into_inner()))
                    .filter(tasks::id.eq_any(uuids))
                    .filter(tasks::deleted_at.is_not_null()),
            )
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn empty_trash(&self, owner: UserId) -> TaskRepositoryResult<usize> {
        self.run_blocking(move |connection| {
            diesel::delete(
                tasks::table
                    .filter(tasks::user_id.eq(owner.into_inner()))
                    .filter(tasks::deleted_at.is_not_null()),
            )
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)
        })
        .await
    }
}

fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        user_id: task.owner().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().as_str().to_owned(),
        due_datetime: task.due_at().map(DueDateTime::as_datetime),
        completed: task.is_completed(),
        overdue: task.overdue_flag(),
        deleted_at: task.deleted_at(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        user_id,
        title: persisted_title,
        description: persisted_description,
        due_datetime,
        completed,
        overdue,
        deleted_at,
        created_at,
        updated_at,
    } = row;

    let title = TaskTitle::new(persisted_title).map_err(TaskRepositoryError::persistence)?;
    let description =
        TaskDescription::new(persisted_description).map_err(TaskRepositoryError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        owner: UserId::from_uuid(user_id),
        title,
        description,
        due_at: due_datetime.map(DueDateTime::from_utc),
        completed,
        overdue,
        deleted_at,
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}
