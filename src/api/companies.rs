use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::StaffUser;
use crate::api::validation::{required_text, validate_payload, JsonBody};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::CompanyStatus;
use crate::repositories;
use crate::schemas::entity::{CompanyCreate, CompanyListQuery, CompanyResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list_companies).post(create_company))
}

async fn create_company(
    StaffUser(staff): StaffUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CompanyCreate>,
) -> Result<(StatusCode, Json<CompanyResponse>), ApiError> {
    validate_payload(&payload)?;
    let name = required_text(&payload.name, "name")?;

    let company = repositories::companies::create(
        state.db(),
        repositories::companies::CreateCompany {
            id: &Uuid::new_v4().to_string(),
            name,
            email: payload.email.as_deref().map(str::trim),
            status: payload.status.unwrap_or(CompanyStatus::Active),
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create company"))?;

    tracing::info!(company_id = %company.id, created_by = %staff.email, "Company created");
    Ok((StatusCode::CREATED, Json(CompanyResponse::from_db(company))))
}

async fn list_companies(
    StaffUser(_staff): StaffUser,
    State(state): State<AppState>,
    Query(params): Query<CompanyListQuery>,
) -> Result<Json<Vec<CompanyResponse>>, ApiError> {
    let companies = repositories::companies::list(state.db(), params.status)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list companies"))?;

    Ok(Json(companies.into_iter().map(CompanyResponse::from_db).collect()))
}

#[cfg(test)]
mod tests;
