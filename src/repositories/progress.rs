//! Read-only aggregate queries behind the progress dashboards.
//!
//! Every query takes a [`Scope`]; `None` fields do not filter. Company scoping
//! always goes through *active* assignments.

use sqlx::PgPool;
use time::{Date, PrimitiveDateTime};

use crate::db::types::ProjectStatus;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Scope<'a> {
    pub(crate) company_id: Option<&'a str>,
    pub(crate) project_id: Option<&'a str>,
    pub(crate) since: Option<PrimitiveDateTime>,
}

impl<'a> Scope<'a> {
    pub(crate) fn without_window(self) -> Self {
        Self { since: None, ..self }
    }
}

#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
pub(crate) struct CompanyCounts {
    pub(crate) total: i64,
    pub(crate) active: i64,
}

#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
pub(crate) struct ProjectCounts {
    pub(crate) total: i64,
    pub(crate) active: i64,
    pub(crate) completed: i64,
}

#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
pub(crate) struct TaskStatusCounts {
    pub(crate) total: i64,
    pub(crate) pending: i64,
    pub(crate) in_progress: i64,
    pub(crate) completed: i64,
    pub(crate) cancelled: i64,
}

#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
pub(crate) struct CompletionAggregate {
    pub(crate) approved_count: i64,
    pub(crate) average_quality: Option<f64>,
    pub(crate) total_hours: f64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ProjectProgressRow {
    pub(crate) project_id: String,
    pub(crate) name: String,
    pub(crate) status: ProjectStatus,
    pub(crate) progress_percentage: i32,
    pub(crate) total_tasks: i64,
    pub(crate) completed_tasks: i64,
    pub(crate) total_hours: f64,
    pub(crate) average_quality: Option<f64>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct CompanyProgressRow {
    pub(crate) company_id: String,
    pub(crate) company_name: String,
    pub(crate) total_tasks: i64,
    pub(crate) completed_tasks: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub(crate) struct MonthCount {
    pub(crate) month: Date,
    pub(crate) count: i64,
}

pub(crate) async fn company_counts(
    pool: &PgPool,
    since: Option<PrimitiveDateTime>,
) -> Result<CompanyCounts, sqlx::Error> {
    sqlx::query_as::<_, CompanyCounts>(
        "SELECT COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'active') AS active
         FROM companies
         WHERE ($1::timestamp IS NULL OR created_at >= $1)",
    )
    .bind(since)
    .fetch_one(pool)
    .await
}

pub(crate) async fn project_counts(
    pool: &PgPool,
    scope: Scope<'_>,
) -> Result<ProjectCounts, sqlx::Error> {
    sqlx::query_as::<_, ProjectCounts>(
        "SELECT COUNT(*) AS total,
                COUNT(*) FILTER (WHERE p.status = 'active') AS active,
                COUNT(*) FILTER (WHERE p.status = 'completed') AS completed
         FROM projects p
         WHERE ($1::text IS NULL OR EXISTS (
                   SELECT 1 FROM project_company_assignments pa
                   WHERE pa.project_id = p.id AND pa.company_id = $1 AND pa.status = 'active'))
           AND ($2::text IS NULL OR p.id = $2)
           AND ($3::timestamp IS NULL OR p.created_at >= $3)",
    )
    .bind(scope.company_id)
    .bind(scope.project_id)
    .bind(scope.since)
    .fetch_one(pool)
    .await
}

pub(crate) async fn task_status_counts(
    pool: &PgPool,
    scope: Scope<'_>,
) -> Result<TaskStatusCounts, sqlx::Error> {
    sqlx::query_as::<_, TaskStatusCounts>(
        "SELECT COUNT(*) AS total,
                COUNT(*) FILTER (WHERE t.status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE t.status = 'in_progress') AS in_progress,
                COUNT(*) FILTER (WHERE t.status = 'completed') AS completed,
                COUNT(*) FILTER (WHERE t.status = 'cancelled') AS cancelled
         FROM tasks t
         WHERE ($1::text IS NULL OR EXISTS (
                   SELECT 1 FROM task_company_assignments ta
                   WHERE ta.task_id = t.id AND ta.company_id = $1 AND ta.status = 'active'))
           AND ($2::text IS NULL OR t.project_id = $2)
           AND ($3::timestamp IS NULL OR t.created_at >= $3)",
    )
    .bind(scope.company_id)
    .bind(scope.project_id)
    .bind(scope.since)
    .fetch_one(pool)
    .await
}

pub(crate) async fn approved_completions(
    pool: &PgPool,
    scope: Scope<'_>,
) -> Result<CompletionAggregate, sqlx::Error> {
    sqlx::query_as::<_, CompletionAggregate>(
        "SELECT COUNT(*) AS approved_count,
                AVG(tc.quality_score) AS average_quality,
                COALESCE(SUM(tc.actual_hours), 0)::float8 AS total_hours
         FROM task_completions tc
         JOIN tasks t ON t.id = tc.task_id
         WHERE tc.status = 'approved'
           AND ($1::text IS NULL OR tc.company_id = $1)
           AND ($2::text IS NULL OR t.project_id = $2)
           AND ($3::timestamp IS NULL OR tc.completion_date >= $3)",
    )
    .bind(scope.company_id)
    .bind(scope.project_id)
    .bind(scope.since)
    .fetch_one(pool)
    .await
}

/// Completions still waiting for review. Never windowed.
pub(crate) async fn pending_approvals(
    pool: &PgPool,
    company_id: Option<&str>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*)
         FROM task_completions
         WHERE status = 'pending_approval' AND ($1::text IS NULL OR company_id = $1)",
    )
    .bind(company_id)
    .fetch_one(pool)
    .await
}

/// Per-project rollup for one company's active project assignments.
pub(crate) async fn company_project_progress(
    pool: &PgPool,
    company_id: &str,
    project_id: Option<&str>,
) -> Result<Vec<ProjectProgressRow>, sqlx::Error> {
    sqlx::query_as::<_, ProjectProgressRow>(
        "SELECT p.id AS project_id, p.name, p.status, p.progress_percentage,
                COALESCE(ts.total, 0) AS total_tasks,
                COALESCE(ts.completed, 0) AS completed_tasks,
                COALESCE(cs.hours, 0)::float8 AS total_hours,
                cs.average_quality
         FROM project_company_assignments pa
         JOIN projects p ON p.id = pa.project_id
         LEFT JOIN (
             SELECT t.project_id,
                    COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE t.status = 'completed') AS completed
             FROM tasks t
             JOIN task_company_assignments ta
               ON ta.task_id = t.id AND ta.company_id = $1 AND ta.status = 'active'
             GROUP BY t.project_id
         ) ts ON ts.project_id = p.id
         LEFT JOIN (
             SELECT t.project_id,
                    SUM(tc.actual_hours) AS hours,
                    AVG(tc.quality_score) AS average_quality
             FROM task_completions tc
             JOIN tasks t ON t.id = tc.task_id
             WHERE tc.company_id = $1 AND tc.status = 'approved'
             GROUP BY t.project_id
         ) cs ON cs.project_id = p.id
         WHERE pa.company_id = $1
           AND pa.status = 'active'
           AND ($2::text IS NULL OR p.id = $2)
         ORDER BY p.name",
    )
    .bind(company_id)
    .bind(project_id)
    .fetch_all(pool)
    .await
}

/// Task completion totals per company, for the system dashboard.
pub(crate) async fn company_progress(
    pool: &PgPool,
    scope: Scope<'_>,
) -> Result<Vec<CompanyProgressRow>, sqlx::Error> {
    sqlx::query_as::<_, CompanyProgressRow>(
        "SELECT c.id AS company_id, c.name AS company_name,
                COUNT(t.id) AS total_tasks,
                COUNT(t.id) FILTER (WHERE t.status = 'completed') AS completed_tasks
         FROM companies c
         LEFT JOIN task_company_assignments ta
           ON ta.company_id = c.id AND ta.status = 'active'
         LEFT JOIN tasks t
           ON t.id = ta.task_id AND ($2::text IS NULL OR t.project_id = $2)
         WHERE ($1::text IS NULL OR c.id = $1)
         GROUP BY c.id, c.name
         ORDER BY c.name",
    )
    .bind(scope.company_id)
    .bind(scope.project_id)
    .fetch_all(pool)
    .await
}

/// Approved completions grouped by calendar month of `completion_date`,
/// within `[from, to)`.
pub(crate) async fn monthly_approved_completions(
    pool: &PgPool,
    scope: Scope<'_>,
    from: Date,
    to: Date,
) -> Result<Vec<MonthCount>, sqlx::Error> {
    sqlx::query_as::<_, MonthCount>(
        "SELECT date_trunc('month', tc.completion_date)::date AS month, COUNT(*) AS count
         FROM task_completions tc
         JOIN tasks t ON t.id = tc.task_id
         WHERE tc.status = 'approved'
           AND ($1::text IS NULL OR tc.company_id = $1)
           AND ($2::text IS NULL OR t.project_id = $2)
           AND tc.completion_date >= $3::date
           AND tc.completion_date < $4::date
         GROUP BY 1
         ORDER BY 1",
    )
    .bind(scope.company_id)
    .bind(scope.project_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
}

/// Tasks grouped by calendar month of `created_at`, within `[from, to)`.
pub(crate) async fn monthly_created_tasks(
    pool: &PgPool,
    scope: Scope<'_>,
    from: Date,
    to: Date,
) -> Result<Vec<MonthCount>, sqlx::Error> {
    sqlx::query_as::<_, MonthCount>(
        "SELECT date_trunc('month', t.created_at)::date AS month, COUNT(*) AS count
         FROM tasks t
         WHERE ($1::text IS NULL OR EXISTS (
                   SELECT 1 FROM task_company_assignments ta
                   WHERE ta.task_id = t.id AND ta.company_id = $1 AND ta.status = 'active'))
           AND ($2::text IS NULL OR t.project_id = $2)
           AND t.created_at >= $3::date
           AND t.created_at < $4::date
         GROUP BY 1
         ORDER BY 1",
    )
    .bind(scope.company_id)
    .bind(scope.project_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
}
