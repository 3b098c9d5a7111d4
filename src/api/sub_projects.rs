use axum::extract::{Path, State};
use axum::{routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::{enforce_bulk_rate_limit, CurrentUser, StaffUser};
use crate::api::validation::{required_text, validate_payload, JsonBody};
use crate::core::state::AppState;
use crate::db::types::AssignmentLevel;
use crate::repositories;
use crate::schemas::assignment::{
    SubProjectAssignmentResponse, SubProjectAssignmentsRequest, SubProjectAssignmentsResponse,
};
use crate::services::assignment_cascade::{self, CascadeOptions, PairWrite, PlannedPair};
use crate::services::selection::{check_pair_budget, last_per_key};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:sub_project_id/assignments", get(list_assignments).post(assign_companies))
        .route("/:sub_project_id/assignments/:company_id", get(get_assignment))
}

async fn assign_companies(
    Path(sub_project_id): Path<String>,
    StaffUser(staff): StaffUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SubProjectAssignmentsRequest>,
) -> Result<Json<SubProjectAssignmentsResponse>, ApiError> {
    validate_payload(&payload)?;
    let entries = payload
        .assignments
        .iter()
        .map(|entry| Ok((required_text(&entry.company_id, "companyId")?, entry.status)))
        .collect::<Result<Vec<_>, ApiError>>()?;
    let entries = last_per_key(entries);
    check_pair_budget(
        ("assignments", entries.len()),
        ("subProjectId", 1),
        state.settings().bulk().max_pairs,
    )?;

    repositories::projects::find_sub_project(state.db(), &sub_project_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch sub-project"))?
        .ok_or_else(|| ApiError::NotFound("Sub-project not found".to_string()))?;

    enforce_bulk_rate_limit(&state, &staff).await?;

    let pairs: Vec<PlannedPair<'_>> = entries
        .iter()
        .map(|&(company_id, status)| PlannedPair {
            entity_id: &sub_project_id,
            company_id,
            status,
        })
        .collect();

    let outcome = assignment_cascade::apply(
        state.db(),
        &pairs,
        CascadeOptions {
            level: AssignmentLevel::SubProject,
            write: PairWrite::Upsert,
            auto_assign_parent: payload.auto_assign_parent,
            assigned_by: &staff.email,
        },
    )
    .await;

    tracing::info!(
        sub_project_id = %sub_project_id,
        successful = outcome.results.len(),
        failed = outcome.errors.len(),
        auto_assigned = outcome.auto_assignments.len(),
        assigned_by = %staff.email,
        "Sub-project assignments applied"
    );

    Ok(Json(SubProjectAssignmentsResponse {
        success: true,
        results: outcome.results,
        auto_assignments: outcome.auto_assignments,
        errors: outcome.errors,
    }))
}

async fn list_assignments(
    Path(sub_project_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubProjectAssignmentResponse>>, ApiError> {
    let assignments =
        repositories::assignments::list_for_sub_project(state.db(), &sub_project_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list sub-project assignments"))?;

    Ok(Json(
        assignments
            .into_iter()
            .filter(|view| user.ensure_company_access(&view.company_id).is_ok())
            .map(SubProjectAssignmentResponse::from_view)
            .collect(),
    ))
}

async fn get_assignment(
    Path((sub_project_id, company_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<SubProjectAssignmentResponse>, ApiError> {
    user.ensure_company_access(&company_id)?;

    let view =
        repositories::assignments::find_sub_project_view(state.db(), &sub_project_id, &company_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch sub-project assignment"))?
            .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))?;

    Ok(Json(SubProjectAssignmentResponse::from_view(view)))
}

#[cfg(test)]
mod tests;
