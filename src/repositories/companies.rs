use sqlx::PgPool;

use crate::db::models::Company;
use crate::db::types::CompanyStatus;

const COMPANY_COLUMNS: &str = "id, name, email, status, created_at, updated_at";

pub(crate) struct CreateCompany<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) email: Option<&'a str>,
    pub(crate) status: CompanyStatus,
    pub(crate) now: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateCompany<'_>,
) -> Result<Company, sqlx::Error> {
    sqlx::query_as::<_, Company>(&format!(
        "INSERT INTO companies (id, name, email, status, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$5)
         RETURNING {COMPANY_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.email)
    .bind(params.status)
    .bind(params.now)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    company_id: &str,
) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(&format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1"))
        .bind(company_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list(
    pool: &PgPool,
    status: Option<CompanyStatus>,
) -> Result<Vec<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(&format!(
        "SELECT {COMPANY_COLUMNS}
         FROM companies
         WHERE ($1::companystatus IS NULL OR status = $1)
         ORDER BY name",
    ))
    .bind(status)
    .fetch_all(pool)
    .await
}
