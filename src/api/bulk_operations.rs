use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{routing::post, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::{enforce_bulk_rate_limit, Identity, StaffUser};
use crate::api::validation::{decode_body, JsonBody};
use crate::core::state::AppState;
use crate::db::types::{AssignmentLevel, AssignmentStatus};
use crate::repositories;
use crate::schemas::assignment::{AssignmentResult, AssignmentReportItem};
use crate::schemas::bulk::{
    AssignOptions, AssignmentReportData, BulkOperationRequest, BulkOperationResponse, BulkSummary,
    ChangeStatusData,
};
use crate::services::assignment_cascade::{self, CascadeOptions, CascadeOutcome, PairWrite};
use crate::services::selection::{check_pair_budget, dedup_ids};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", post(run_bulk_operation))
}

async fn run_bulk_operation(
    StaffUser(staff): StaffUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<serde_json::Value>,
) -> Result<Response, ApiError> {
    let request: BulkOperationRequest = decode_body(body)?;
    let operation = request.name();

    let response = match request {
        BulkOperationRequest::AssignProjectsToCompanies(data) => {
            let target = (AssignmentLevel::Project, "projectIds");
            assign(&state, &staff, operation, target, &data.project_ids, data.options).await?
        }
        BulkOperationRequest::AssignSubProjectsToCompanies(data) => {
            let target = (AssignmentLevel::SubProject, "subProjectIds");
            assign(&state, &staff, operation, target, &data.sub_project_ids, data.options).await?
        }
        BulkOperationRequest::AssignTasksToCompanies(data) => {
            let target = (AssignmentLevel::Task, "taskIds");
            assign(&state, &staff, operation, target, &data.task_ids, data.options).await?
        }
        BulkOperationRequest::ChangeAssignmentStatus(data) => {
            change_status(&state, &staff, operation, data).await?
        }
        BulkOperationRequest::GenerateAssignmentReport(data) => {
            return Ok(Json(assignment_report(&state, operation, data).await?).into_response());
        }
    };

    Ok(Json(response).into_response())
}

async fn assign(
    state: &AppState,
    staff: &Identity,
    operation: &'static str,
    (level, field): (AssignmentLevel, &'static str),
    entity_ids: &[String],
    options: AssignOptions,
) -> Result<BulkOperationResponse<AssignmentResult>, ApiError> {
    let entity_ids = dedup_ids(entity_ids);
    let company_ids = dedup_ids(&options.company_ids);
    let total = check_pair_budget(
        (field, entity_ids.len()),
        ("companyIds", company_ids.len()),
        state.settings().bulk().max_pairs,
    )?;
    enforce_bulk_rate_limit(state, staff).await?;

    let pairs = assignment_cascade::uniform_pairs(&entity_ids, &company_ids, options.status);
    let outcome = assignment_cascade::apply(
        state.db(),
        &pairs,
        CascadeOptions {
            level,
            write: PairWrite::Upsert,
            auto_assign_parent: options.auto_assign_parent,
            assigned_by: &staff.email,
        },
    )
    .await;

    Ok(cascade_response(operation, staff, total, outcome))
}

async fn change_status(
    state: &AppState,
    staff: &Identity,
    operation: &'static str,
    data: ChangeStatusData,
) -> Result<BulkOperationResponse<AssignmentResult>, ApiError> {
    let entity_ids = dedup_ids(&data.entity_ids);
    let company_ids = dedup_ids(&data.company_ids);
    let total = check_pair_budget(
        ("entityIds", entity_ids.len()),
        ("companyIds", company_ids.len()),
        state.settings().bulk().max_pairs,
    )?;
    enforce_bulk_rate_limit(state, staff).await?;

    let pairs = assignment_cascade::uniform_pairs(&entity_ids, &company_ids, data.status);
    let outcome = assignment_cascade::apply(
        state.db(),
        &pairs,
        CascadeOptions {
            level: data.level,
            write: PairWrite::ExistingOnly,
            auto_assign_parent: data.status == AssignmentStatus::Active,
            assigned_by: &staff.email,
        },
    )
    .await;

    Ok(cascade_response(operation, staff, total, outcome))
}

fn cascade_response(
    operation: &'static str,
    staff: &Identity,
    total: usize,
    outcome: CascadeOutcome,
) -> BulkOperationResponse<AssignmentResult> {
    let summary =
        BulkSummary { total, successful: outcome.results.len(), failed: outcome.errors.len() };

    tracing::info!(
        operation,
        total = summary.total,
        successful = summary.successful,
        failed = summary.failed,
        auto_assigned = outcome.auto_assignments.len(),
        requested_by = %staff.email,
        "Bulk operation finished"
    );

    BulkOperationResponse {
        success: true,
        operation,
        results: outcome.results,
        auto_assignments: Some(outcome.auto_assignments),
        errors: outcome.errors,
        summary,
    }
}

async fn assignment_report(
    state: &AppState,
    operation: &'static str,
    data: AssignmentReportData,
) -> Result<BulkOperationResponse<AssignmentReportItem>, ApiError> {
    let entity_ids = dedup_ids(&data.entity_ids);
    let company_ids = dedup_ids(&data.company_ids);

    let rows = repositories::assignments::list_for_report(
        state.db(),
        data.level,
        &entity_ids,
        &company_ids,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to build assignment report"))?;

    let total = rows.len();
    let successful = rows.iter().filter(|row| row.status == AssignmentStatus::Active).count();
    let results =
        rows.into_iter().map(|row| AssignmentReportItem::from_row(data.level, row)).collect();

    Ok(BulkOperationResponse {
        success: true,
        operation,
        results,
        auto_assignments: None,
        errors: Vec::new(),
        summary: BulkSummary { total, successful, failed: total - successful },
    })
}
