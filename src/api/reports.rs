use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::{AdminUser, CurrentUser, StaffUser};
use crate::api::validation::{required_text, validate_payload, JsonBody};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::reports::{RatingFields, UpdateReport};
use crate::schemas::report::{
    ReportCreate, ReportCreatedResponse, ReportListQuery, ReportResponse, ReportUpdate,
};
use crate::services::completion_pipeline::{self, NewReport, ReportError};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reports).post(create_report))
        .route("/:report_id", patch(update_report).delete(delete_report))
}

impl From<ReportError> for ApiError {
    fn from(error: ReportError) -> Self {
        match error {
            ReportError::AssignmentNotFound => ApiError::NotFound(error.to_string()),
            ReportError::AlreadyExists => ApiError::Conflict(error.to_string()),
            ReportError::Internal(err) => ApiError::internal(err, "Failed to create report"),
        }
    }
}

async fn create_report(
    StaffUser(staff): StaffUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ReportCreate>,
) -> Result<(StatusCode, Json<ReportCreatedResponse>), ApiError> {
    validate_payload(&payload)?;
    let sub_project_id = required_text(&payload.sub_project_id, "subProjectId")?;
    let company_id = required_text(&payload.company_id, "companyId")?;
    let overall_rating = payload
        .overall_rating
        .ok_or_else(|| ApiError::BadRequest("overallRating is required".to_string()))?;

    let report = completion_pipeline::create_report(
        state.db(),
        NewReport {
            sub_project_id,
            company_id,
            consultant_email: &staff.email,
            ratings: RatingFields {
                overall_rating,
                quality_score: payload.quality_score,
                timeliness_score: payload.timeliness_score,
                communication_score: payload.communication_score,
                strengths: payload.strengths.as_deref(),
                areas_for_improvement: payload.areas_for_improvement.as_deref(),
                recommendations: payload.recommendations.as_deref(),
                general_feedback: payload.general_feedback.as_deref(),
            },
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReportCreatedResponse {
            success: true,
            report: ReportResponse::from_db(report),
            message: "Report created and company notified".to_string(),
        }),
    ))
}

async fn list_reports(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<ReportListQuery>,
) -> Result<Json<Vec<ReportResponse>>, ApiError> {
    let requested = params.company_id.as_deref().map(str::trim).filter(|v| !v.is_empty());
    let company_id = if user.role.is_staff() {
        requested.map(str::to_string)
    } else {
        Some(user.resolve_company(requested)?)
    };
    let sub_project_id = params.sub_project_id.as_deref().map(str::trim).filter(|v| !v.is_empty());

    let reports = repositories::reports::list(state.db(), sub_project_id, company_id.as_deref())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list reports"))?;

    Ok(Json(reports.into_iter().map(ReportResponse::from_db).collect()))
}

async fn update_report(
    Path(report_id): Path<String>,
    StaffUser(staff): StaffUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ReportUpdate>,
) -> Result<Json<ReportResponse>, ApiError> {
    validate_payload(&payload)?;

    let report = repositories::reports::update_feedback(
        state.db(),
        &report_id,
        UpdateReport {
            overall_rating: payload.overall_rating,
            quality_score: payload.quality_score,
            timeliness_score: payload.timeliness_score,
            communication_score: payload.communication_score,
            strengths: payload.strengths,
            areas_for_improvement: payload.areas_for_improvement,
            recommendations: payload.recommendations,
            general_feedback: payload.general_feedback,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update report"))?
    .ok_or_else(|| ApiError::NotFound("Report not found".to_string()))?;

    tracing::info!(report_id = %report.id, updated_by = %staff.email, "Sub-project report updated");
    Ok(Json(ReportResponse::from_db(report)))
}

async fn delete_report(
    Path(report_id): Path<String>,
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::reports::delete(state.db(), &report_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete report"))?;
    if !deleted {
        return Err(ApiError::NotFound("Report not found".to_string()));
    }

    tracing::info!(report_id = %report_id, deleted_by = %admin.email, "Sub-project report deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests;
