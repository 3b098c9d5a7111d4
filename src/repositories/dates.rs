use sqlx::PgPool;
use time::Date;

use crate::db::models::CompanyDates;
use crate::db::types::AssignmentLevel;

pub(crate) struct UpsertDates<'a> {
    pub(crate) entity_id: &'a str,
    pub(crate) company_id: &'a str,
    pub(crate) start_date: Option<Date>,
    pub(crate) end_date: Option<Date>,
    pub(crate) is_flexible: bool,
    pub(crate) now: time::PrimitiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct CompanyDatesView {
    #[sqlx(flatten)]
    pub(crate) dates: CompanyDates,
    pub(crate) company_name: String,
}

pub(crate) async fn upsert(
    pool: &PgPool,
    level: AssignmentLevel,
    params: UpsertDates<'_>,
) -> Result<CompanyDates, sqlx::Error> {
    let sql = format!(
        "INSERT INTO {table} (
            id, {column}, company_id, start_date, end_date, is_flexible, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$7)
         ON CONFLICT ({column}, company_id)
         DO UPDATE SET start_date = EXCLUDED.start_date,
                       end_date = EXCLUDED.end_date,
                       is_flexible = EXCLUDED.is_flexible,
                       updated_at = EXCLUDED.updated_at
         RETURNING id, {column} AS entity_id, company_id, start_date, end_date, is_flexible,
                   updated_at",
        table = level.dates_table(),
        column = level.entity_column(),
    );

    sqlx::query_as::<_, CompanyDates>(&sql)
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(params.entity_id)
        .bind(params.company_id)
        .bind(params.start_date)
        .bind(params.end_date)
        .bind(params.is_flexible)
        .bind(params.now)
        .fetch_one(pool)
        .await
}

/// Nulls the date range of every company row for one entity.
pub(crate) async fn clear_for_entity(
    pool: &PgPool,
    level: AssignmentLevel,
    entity_id: &str,
    now: time::PrimitiveDateTime,
) -> Result<u64, sqlx::Error> {
    let sql = format!(
        "UPDATE {table}
         SET start_date = NULL, end_date = NULL, updated_at = $1
         WHERE {column} = $2",
        table = level.dates_table(),
        column = level.entity_column(),
    );

    let result = sqlx::query(&sql).bind(now).bind(entity_id).execute(pool).await?;
    Ok(result.rows_affected())
}

/// Date rows at `level` for everything that hangs under `project_id`.
pub(crate) async fn list_for_project(
    pool: &PgPool,
    level: AssignmentLevel,
    project_id: &str,
) -> Result<Vec<CompanyDatesView>, sqlx::Error> {
    let scope = match level {
        AssignmentLevel::Project => "d.project_id = $1",
        AssignmentLevel::SubProject => {
            "d.sub_project_id IN (SELECT id FROM sub_projects WHERE project_id = $1)"
        }
        AssignmentLevel::Task => "d.task_id IN (SELECT id FROM tasks WHERE project_id = $1)",
    };

    let sql = format!(
        "SELECT d.id, d.{column} AS entity_id, d.company_id, d.start_date, d.end_date,
                d.is_flexible, d.updated_at, c.name AS company_name
         FROM {table} d
         JOIN companies c ON c.id = d.company_id
         WHERE {scope}
         ORDER BY d.{column}, c.name",
        table = level.dates_table(),
        column = level.entity_column(),
    );

    sqlx::query_as::<_, CompanyDatesView>(&sql).bind(project_id).fetch_all(pool).await
}

/// Whether `item_id` is the project itself or one of its sub-projects/tasks.
pub(crate) async fn item_belongs_to_project(
    pool: &PgPool,
    level: AssignmentLevel,
    item_id: &str,
    project_id: &str,
) -> Result<bool, sqlx::Error> {
    let sql = match level {
        AssignmentLevel::Project => {
            "SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1 AND id = $2)"
        }
        AssignmentLevel::SubProject => {
            "SELECT EXISTS(SELECT 1 FROM sub_projects WHERE id = $1 AND project_id = $2)"
        }
        AssignmentLevel::Task => {
            "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = $1 AND project_id = $2)"
        }
    };

    sqlx::query_scalar::<_, bool>(sql).bind(item_id).bind(project_id).fetch_one(pool).await
}
