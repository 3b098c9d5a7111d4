use axum::extract::{Query, State};
use axum::{routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentUser, StaffUser};
use crate::core::state::AppState;
use crate::schemas::progress::{CompanyProgressResponse, ProgressQuery, SystemProgressResponse};
use crate::services::progress::{self, parse_time_range};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/firma/progress", get(company_progress))
        .route("/progress/dashboard", get(system_dashboard))
}

fn optional_filter(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

async fn company_progress(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<ProgressQuery>,
) -> Result<Json<CompanyProgressResponse>, ApiError> {
    let settings = state.settings().progress();
    let days = parse_time_range(params.time_range.as_deref(), settings.default_days)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let company_id = user.resolve_company(params.company_id.as_deref())?;

    let response = progress::company_progress(
        state.db(),
        settings,
        &company_id,
        optional_filter(params.project_id.as_deref()),
        days,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to compute company progress"))?;

    Ok(Json(response))
}

async fn system_dashboard(
    StaffUser(_staff): StaffUser,
    State(state): State<AppState>,
    Query(params): Query<ProgressQuery>,
) -> Result<Json<SystemProgressResponse>, ApiError> {
    let settings = state.settings().progress();
    let days = parse_time_range(params.time_range.as_deref(), settings.default_days)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let response = progress::system_progress(
        state.db(),
        settings,
        optional_filter(params.company_id.as_deref()),
        optional_filter(params.project_id.as_deref()),
        days,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to compute progress dashboard"))?;

    Ok(Json(response))
}

#[cfg(test)]
mod tests;
