use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{enforce_bulk_rate_limit, CurrentUser, StaffUser};
use crate::api::validation::{decode_body, required_text, validate_payload, JsonBody};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::{AssignmentLevel, ProjectStatus};
use crate::repositories;
use crate::repositories::dates::CompanyDatesView;
use crate::schemas::dates::{
    CompanyDatesResponse, DateSelection, DatesOperationRequest, DatesOperationResponse,
    ProjectDatesResponse, SetDatesRequest,
};
use crate::schemas::entity::{ProjectCreate, ProjectResponse, SubProjectResponse};
use crate::services::bulk_dates::{self, DatePairInput};
use crate::services::selection::{check_pair_budget, dedup_ids};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route("/:project_id/sub-projects", get(list_sub_projects).post(create_sub_project))
        .route("/:project_id/dates", get(get_project_dates).post(apply_project_dates))
}

async fn create_project(
    StaffUser(staff): StaffUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ProjectCreate>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    validate_payload(&payload)?;
    let name = required_text(&payload.name, "name")?;

    let project = repositories::projects::create(
        state.db(),
        repositories::projects::CreateProject {
            id: &Uuid::new_v4().to_string(),
            name,
            description: payload.description.as_deref(),
            status: payload.status.unwrap_or(ProjectStatus::Planned),
            created_by: &staff.email,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create project"))?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from_db(project))))
}

async fn list_projects(
    StaffUser(_staff): StaffUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let projects = repositories::projects::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list projects"))?;

    Ok(Json(projects.into_iter().map(ProjectResponse::from_db).collect()))
}

async fn create_sub_project(
    Path(project_id): Path<String>,
    StaffUser(_staff): StaffUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ProjectCreate>,
) -> Result<(StatusCode, Json<SubProjectResponse>), ApiError> {
    validate_payload(&payload)?;
    let name = required_text(&payload.name, "name")?;

    let created = repositories::projects::create_sub_project(
        state.db(),
        repositories::projects::CreateSubProject {
            id: &Uuid::new_v4().to_string(),
            project_id: &project_id,
            name,
            description: payload.description.as_deref(),
            status: payload.status.unwrap_or(ProjectStatus::Planned),
            now: primitive_now_utc(),
        },
    )
    .await;

    match created {
        Ok(sub_project) => {
            Ok((StatusCode::CREATED, Json(SubProjectResponse::from_db(sub_project))))
        }
        Err(err) if crate::db::is_foreign_key_violation(&err) => {
            Err(ApiError::NotFound("Project not found".to_string()))
        }
        Err(err) => Err(ApiError::internal(err, "Failed to create sub-project")),
    }
}

async fn list_sub_projects(
    Path(project_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubProjectResponse>>, ApiError> {
    let sub_projects = repositories::projects::list_sub_projects(state.db(), &project_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list sub-projects"))?;

    Ok(Json(sub_projects.into_iter().map(SubProjectResponse::from_db).collect()))
}

async fn ensure_project(state: &AppState, project_id: &str) -> Result<(), ApiError> {
    repositories::projects::find_by_id(state.db(), project_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch project"))?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))
}

async fn get_project_dates(
    Path(project_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ProjectDatesResponse>, ApiError> {
    ensure_project(&state, &project_id).await?;

    let (project, sub_projects, tasks) = tokio::try_join!(
        repositories::dates::list_for_project(state.db(), AssignmentLevel::Project, &project_id),
        repositories::dates::list_for_project(state.db(), AssignmentLevel::SubProject, &project_id),
        repositories::dates::list_for_project(state.db(), AssignmentLevel::Task, &project_id),
    )
    .map_err(|e| ApiError::internal(e, "Failed to fetch project dates"))?;

    let visible = |rows: Vec<CompanyDatesView>| -> Vec<CompanyDatesResponse> {
        rows.into_iter()
            .filter(|row| user.ensure_company_access(&row.dates.company_id).is_ok())
            .map(CompanyDatesResponse::from_view)
            .collect()
    };

    Ok(Json(ProjectDatesResponse {
        project: visible(project),
        sub_projects: visible(sub_projects),
        tasks: visible(tasks),
        project_id,
    }))
}

async fn apply_project_dates(
    Path(project_id): Path<String>,
    StaffUser(staff): StaffUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<serde_json::Value>,
) -> Result<Json<DatesOperationResponse>, ApiError> {
    let request: DatesOperationRequest = decode_body(body)?;
    let operation = request.name();
    let max_pairs = state.settings().bulk().max_pairs;

    ensure_project(&state, &project_id).await?;

    let outcome = match request {
        DatesOperationRequest::SetDates(SetDatesRequest { level, selection }) => match selection {
            DateSelection::Uniform(dates) => {
                let item_ids = dedup_ids(&dates.item_ids);
                let company_id = required_text(&dates.company_id, "companyId")?;
                check_pair_budget(("itemIds", item_ids.len()), ("companyId", 1), max_pairs)?;
                enforce_bulk_rate_limit(&state, &staff).await?;

                let pairs = item_ids
                    .iter()
                    .map(|item_id| DatePairInput {
                        item_id,
                        company_id,
                        start_date: dates.start_date.as_deref(),
                        end_date: dates.end_date.as_deref(),
                        is_flexible: dates.is_flexible,
                    })
                    .collect::<Vec<_>>();
                bulk_dates::set_dates(state.db(), &project_id, level, &pairs, false).await
            }
            DateSelection::PerPair(dates) => {
                check_pair_budget(("pairs", dates.pairs.len()), ("pairs", 1), max_pairs)?;
                enforce_bulk_rate_limit(&state, &staff).await?;

                let pairs = dates
                    .pairs
                    .iter()
                    .map(|pair| DatePairInput {
                        item_id: pair.item_id.trim(),
                        company_id: pair.company_id.trim(),
                        start_date: pair.start_date.as_deref(),
                        end_date: pair.end_date.as_deref(),
                        is_flexible: pair.is_flexible,
                    })
                    .collect::<Vec<_>>();
                bulk_dates::set_dates(state.db(), &project_id, level, &pairs, true).await
            }
        },
        DatesOperationRequest::RemoveDates(request) => {
            let item_ids = dedup_ids(&request.item_ids);
            check_pair_budget(("itemIds", item_ids.len()), ("level", 1), max_pairs)?;
            enforce_bulk_rate_limit(&state, &staff).await?;
            bulk_dates::remove_dates(state.db(), &project_id, request.level, &item_ids).await
        }
    };

    tracing::info!(
        operation,
        project_id = %project_id,
        successful = outcome.successful,
        failed = outcome.errors.len(),
        requested_by = %staff.email,
        "Date operation applied"
    );

    Ok(Json(DatesOperationResponse {
        success: true,
        operation,
        successful: outcome.successful,
        failed: outcome.errors.len(),
        results: outcome.results.into_iter().map(CompanyDatesResponse::from_db).collect(),
        errors: outcome.errors,
    }))
}
