use sqlx::{PgConnection, PgPool};

use crate::db::models::{Project, SubProject};
use crate::db::types::ProjectStatus;

const PROJECT_COLUMNS: &str =
    "id, name, description, status, progress_percentage, created_by, created_at, updated_at";
const SUB_PROJECT_COLUMNS: &str =
    "id, project_id, name, description, status, progress_percentage, created_at, updated_at";

pub(crate) struct CreateProject<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) status: ProjectStatus,
    pub(crate) created_by: &'a str,
    pub(crate) now: time::PrimitiveDateTime,
}

pub(crate) struct CreateSubProject<'a> {
    pub(crate) id: &'a str,
    pub(crate) project_id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) status: ProjectStatus,
    pub(crate) now: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateProject<'_>,
) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(&format!(
        "INSERT INTO projects (id, name, description, status, created_by, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$6)
         RETURNING {PROJECT_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.description)
    .bind(params.status)
    .bind(params.created_by)
    .bind(params.now)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    project_id: &str,
) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(&format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"))
        .bind(project_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn create_sub_project(
    pool: &PgPool,
    params: CreateSubProject<'_>,
) -> Result<SubProject, sqlx::Error> {
    sqlx::query_as::<_, SubProject>(&format!(
        "INSERT INTO sub_projects (
            id, project_id, name, description, status, created_at, updated_at
         )
         VALUES ($1,$2,$3,$4,$5,$6,$6)
         RETURNING {SUB_PROJECT_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.project_id)
    .bind(params.name)
    .bind(params.description)
    .bind(params.status)
    .bind(params.now)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_sub_project(
    pool: &PgPool,
    sub_project_id: &str,
) -> Result<Option<SubProject>, sqlx::Error> {
    sqlx::query_as::<_, SubProject>(&format!(
        "SELECT {SUB_PROJECT_COLUMNS} FROM sub_projects WHERE id = $1"
    ))
    .bind(sub_project_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_sub_projects(
    pool: &PgPool,
    project_id: &str,
) -> Result<Vec<SubProject>, sqlx::Error> {
    sqlx::query_as::<_, SubProject>(&format!(
        "SELECT {SUB_PROJECT_COLUMNS} FROM sub_projects WHERE project_id = $1 ORDER BY name"
    ))
    .bind(project_id)
    .fetch_all(pool)
    .await
}

/// Parent project of a sub-project, read inside the caller's transaction.
pub(crate) async fn parent_of_sub_project(
    conn: &mut PgConnection,
    sub_project_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT project_id FROM sub_projects WHERE id = $1")
        .bind(sub_project_id)
        .fetch_optional(conn)
        .await
}
