use sqlx::{PgConnection, PgPool};

use crate::db::models::Assignment;
use crate::db::types::{AssignmentLevel, AssignmentStatus, CompanyStatus, CompletionStatus};

/// Derives `all_tasks_completed` for a sub-project assignment aliased `a`:
/// the company has at least one active task under the sub-project and every
/// one of them is completed.
pub(crate) const ALL_TASKS_COMPLETED_SQL: &str = "(
    EXISTS (
        SELECT 1 FROM tasks t
        JOIN task_company_assignments ta ON ta.task_id = t.id
        WHERE t.sub_project_id = a.sub_project_id
          AND ta.company_id = a.company_id
          AND ta.status = 'active'
    )
    AND NOT EXISTS (
        SELECT 1 FROM tasks t
        JOIN task_company_assignments ta ON ta.task_id = t.id
        WHERE t.sub_project_id = a.sub_project_id
          AND ta.company_id = a.company_id
          AND ta.status = 'active'
          AND t.status <> 'completed'
    )
)";

fn assignment_columns(level: AssignmentLevel) -> String {
    format!(
        "id, {} AS entity_id, company_id, status, assigned_by, assigned_at",
        level.entity_column()
    )
}

pub(crate) struct UpsertAssignment<'a> {
    pub(crate) entity_id: &'a str,
    pub(crate) company_id: &'a str,
    pub(crate) status: AssignmentStatus,
    pub(crate) assigned_by: &'a str,
    pub(crate) assigned_at: time::PrimitiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UpsertAction {
    Created,
    Updated,
}

#[derive(Debug, sqlx::FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    assignment: Assignment,
    inserted: bool,
}

/// Outcome of promoting a parent-level assignment to `active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParentActivation {
    Created,
    Reactivated,
    AlreadyActive,
}

/// Inserts or updates the single row for `(entity, company)` at `level`.
pub(crate) async fn upsert(
    conn: &mut PgConnection,
    level: AssignmentLevel,
    params: UpsertAssignment<'_>,
) -> Result<(Assignment, UpsertAction), sqlx::Error> {
    let sql = format!(
        "INSERT INTO {table} AS t (id, {column}, company_id, status, assigned_by, assigned_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         ON CONFLICT ({column}, company_id)
         DO UPDATE SET status = EXCLUDED.status,
                       assigned_by = EXCLUDED.assigned_by,
                       assigned_at = EXCLUDED.assigned_at
         RETURNING {columns}, (xmax = 0) AS inserted",
        table = level.assignment_table(),
        column = level.entity_column(),
        columns = assignment_columns(level),
    );

    let row = sqlx::query_as::<_, UpsertRow>(&sql)
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(params.entity_id)
        .bind(params.company_id)
        .bind(params.status)
        .bind(params.assigned_by)
        .bind(params.assigned_at)
        .fetch_one(conn)
        .await?;

    let action = if row.inserted { UpsertAction::Created } else { UpsertAction::Updated };
    Ok((row.assignment, action))
}

/// Ensures an active assignment exists at a parent level. Rows that are
/// already active are left untouched.
pub(crate) async fn activate_parent(
    conn: &mut PgConnection,
    level: AssignmentLevel,
    entity_id: &str,
    company_id: &str,
    assigned_by: &str,
    now: time::PrimitiveDateTime,
) -> Result<ParentActivation, sqlx::Error> {
    let sql = format!(
        "INSERT INTO {table} AS t (id, {column}, company_id, status, assigned_by, assigned_at)
         VALUES ($1,$2,$3,'active',$4,$5)
         ON CONFLICT ({column}, company_id)
         DO UPDATE SET status = 'active',
                       assigned_by = EXCLUDED.assigned_by,
                       assigned_at = EXCLUDED.assigned_at
         WHERE t.status <> 'active'
         RETURNING (xmax = 0) AS inserted",
        table = level.assignment_table(),
        column = level.entity_column(),
    );

    let inserted = sqlx::query_scalar::<_, bool>(&sql)
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(entity_id)
        .bind(company_id)
        .bind(assigned_by)
        .bind(now)
        .fetch_optional(conn)
        .await?;

    Ok(match inserted {
        Some(true) => ParentActivation::Created,
        Some(false) => ParentActivation::Reactivated,
        None => ParentActivation::AlreadyActive,
    })
}

/// Changes the status of an existing row only; `None` when the pair has never
/// been assigned.
pub(crate) async fn update_status(
    conn: &mut PgConnection,
    level: AssignmentLevel,
    params: UpsertAssignment<'_>,
) -> Result<Option<Assignment>, sqlx::Error> {
    let sql = format!(
        "UPDATE {table}
         SET status = $1, assigned_by = $2, assigned_at = $3
         WHERE {column} = $4 AND company_id = $5
         RETURNING {columns}",
        table = level.assignment_table(),
        column = level.entity_column(),
        columns = assignment_columns(level),
    );

    sqlx::query_as::<_, Assignment>(&sql)
        .bind(params.status)
        .bind(params.assigned_by)
        .bind(params.assigned_at)
        .bind(params.entity_id)
        .bind(params.company_id)
        .fetch_optional(conn)
        .await
}

pub(crate) async fn find(
    pool: &PgPool,
    level: AssignmentLevel,
    entity_id: &str,
    company_id: &str,
) -> Result<Option<Assignment>, sqlx::Error> {
    let sql = format!(
        "SELECT {columns} FROM {table} WHERE {column} = $1 AND company_id = $2",
        table = level.assignment_table(),
        column = level.entity_column(),
        columns = assignment_columns(level),
    );

    sqlx::query_as::<_, Assignment>(&sql)
        .bind(entity_id)
        .bind(company_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn has_active(
    pool: &PgPool,
    level: AssignmentLevel,
    entity_id: &str,
    company_id: &str,
) -> Result<bool, sqlx::Error> {
    Ok(find(pool, level, entity_id, company_id)
        .await?
        .is_some_and(|assignment| assignment.status == AssignmentStatus::Active))
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct SubProjectAssignmentView {
    pub(crate) id: String,
    pub(crate) sub_project_id: String,
    pub(crate) company_id: String,
    pub(crate) company_name: String,
    pub(crate) company_email: Option<String>,
    pub(crate) company_status: CompanyStatus,
    pub(crate) status: AssignmentStatus,
    pub(crate) assigned_by: String,
    pub(crate) assigned_at: time::PrimitiveDateTime,
    pub(crate) completion_status: CompletionStatus,
    pub(crate) consultant_review_required: bool,
    pub(crate) all_tasks_completed: bool,
}

fn sub_project_view_sql(filter: &str) -> String {
    format!(
        "SELECT a.id, a.sub_project_id, a.company_id,
                c.name AS company_name, c.email AS company_email, c.status AS company_status,
                a.status, a.assigned_by, a.assigned_at,
                a.completion_status, a.consultant_review_required,
                {ALL_TASKS_COMPLETED_SQL} AS all_tasks_completed
         FROM sub_project_company_assignments a
         JOIN companies c ON c.id = a.company_id
         WHERE {filter}
         ORDER BY c.name"
    )
}

pub(crate) async fn list_for_sub_project(
    pool: &PgPool,
    sub_project_id: &str,
) -> Result<Vec<SubProjectAssignmentView>, sqlx::Error> {
    sqlx::query_as::<_, SubProjectAssignmentView>(&sub_project_view_sql("a.sub_project_id = $1"))
        .bind(sub_project_id)
        .fetch_all(pool)
        .await
}

pub(crate) async fn find_sub_project_view(
    pool: &PgPool,
    sub_project_id: &str,
    company_id: &str,
) -> Result<Option<SubProjectAssignmentView>, sqlx::Error> {
    sqlx::query_as::<_, SubProjectAssignmentView>(&sub_project_view_sql(
        "a.sub_project_id = $1 AND a.company_id = $2",
    ))
    .bind(sub_project_id)
    .bind(company_id)
    .fetch_optional(pool)
    .await
}

/// Re-derives `consultant_review_required` for every still-open assignment
/// of a sub-project. Called after any task status or task assignment change.
pub(crate) async fn recompute_review_flags(
    conn: &mut PgConnection,
    sub_project_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(&format!(
        "UPDATE sub_project_company_assignments a
         SET consultant_review_required = {ALL_TASKS_COMPLETED_SQL}
         WHERE a.sub_project_id = $1 AND a.completion_status = 'in_progress'"
    ))
    .bind(sub_project_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// One-way `in_progress -> reported` transition.
pub(crate) async fn mark_reported(
    conn: &mut PgConnection,
    sub_project_id: &str,
    company_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE sub_project_company_assignments
         SET completion_status = 'reported', consultant_review_required = FALSE
         WHERE sub_project_id = $1 AND company_id = $2",
    )
    .bind(sub_project_id)
    .bind(company_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct AssignmentReportRow {
    pub(crate) id: String,
    pub(crate) entity_id: String,
    pub(crate) entity_name: String,
    pub(crate) company_id: String,
    pub(crate) company_name: String,
    pub(crate) status: AssignmentStatus,
    pub(crate) assigned_by: String,
    pub(crate) assigned_at: time::PrimitiveDateTime,
}

/// Assignment listing for read-only reports, optionally narrowed to a set of
/// entities and/or companies (an empty slice means "all").
pub(crate) async fn list_for_report(
    pool: &PgPool,
    level: AssignmentLevel,
    entity_ids: &[String],
    company_ids: &[String],
) -> Result<Vec<AssignmentReportRow>, sqlx::Error> {
    let sql = format!(
        "SELECT a.id, a.{column} AS entity_id, e.{label} AS entity_name,
                a.company_id, c.name AS company_name,
                a.status, a.assigned_by, a.assigned_at
         FROM {table} a
         JOIN {entities} e ON e.id = a.{column}
         JOIN companies c ON c.id = a.company_id
         WHERE (cardinality($1::text[]) = 0 OR a.{column} = ANY($1))
           AND (cardinality($2::text[]) = 0 OR a.company_id = ANY($2))
         ORDER BY e.{label}, c.name",
        table = level.assignment_table(),
        column = level.entity_column(),
        entities = level.entity_table(),
        label = level.label_column(),
    );

    sqlx::query_as::<_, AssignmentReportRow>(&sql)
        .bind(entity_ids)
        .bind(company_ids)
        .fetch_all(pool)
        .await
}
