use sqlx::{PgConnection, PgPool};

use crate::db::models::Task;
use crate::db::types::{TaskPriority, TaskStatus};

const TASK_COLUMNS: &str = "id, project_id, sub_project_id, title, description, status, priority, \
                            due_date, completed_at, created_at, updated_at";

pub(crate) struct CreateTask<'a> {
    pub(crate) id: &'a str,
    pub(crate) project_id: &'a str,
    pub(crate) sub_project_id: Option<&'a str>,
    pub(crate) title: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) priority: TaskPriority,
    pub(crate) due_date: Option<time::PrimitiveDateTime>,
    pub(crate) now: time::PrimitiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct TaskParents {
    pub(crate) project_id: String,
    pub(crate) sub_project_id: Option<String>,
}

pub(crate) async fn create(pool: &PgPool, params: CreateTask<'_>) -> Result<Task, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (
            id, project_id, sub_project_id, title, description, status, priority, due_date,
            created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,'pending',$6,$7,$8,$8)
         RETURNING {TASK_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.project_id)
    .bind(params.sub_project_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.priority)
    .bind(params.due_date)
    .bind(params.now)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, task_id: &str) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
        .bind(task_id)
        .fetch_optional(pool)
        .await
}

/// Moves a task to `status`; `completed_at` tracks the transition into `completed`.
pub(crate) async fn update_status(
    conn: &mut PgConnection,
    task_id: &str,
    status: TaskStatus,
    now: time::PrimitiveDateTime,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks
         SET status = $1,
             completed_at = CASE
                WHEN $1 = 'completed'::taskstatus THEN COALESCE(completed_at, $2)
                ELSE NULL
             END,
             updated_at = $2
         WHERE id = $3
         RETURNING {TASK_COLUMNS}",
    ))
    .bind(status)
    .bind(now)
    .bind(task_id)
    .fetch_optional(conn)
    .await
}

pub(crate) async fn parents(
    conn: &mut PgConnection,
    task_id: &str,
) -> Result<Option<TaskParents>, sqlx::Error> {
    sqlx::query_as::<_, TaskParents>("SELECT project_id, sub_project_id FROM tasks WHERE id = $1")
        .bind(task_id)
        .fetch_optional(conn)
        .await
}
