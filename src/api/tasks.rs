use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentUser, StaffUser};
use crate::api::validation::{required_text, validate_payload, JsonBody};
use crate::core::state::AppState;
use crate::core::time::{parse_timestamp, primitive_now_utc};
use crate::db::types::TaskPriority;
use crate::repositories;
use crate::schemas::completion::{CompletionCreate, CompletionResponse};
use crate::schemas::entity::{TaskCreate, TaskResponse, TaskStatusUpdate};
use crate::services::completion_pipeline::{self, SubmitCompletion};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_task))
        .route("/:task_id/status", patch(update_task_status))
        .route("/:task_id/completions", post(submit_completion).get(list_completions))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionListQuery {
    #[serde(default)]
    company_id: Option<String>,
}

async fn create_task(
    StaffUser(_staff): StaffUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<TaskCreate>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    validate_payload(&payload)?;
    let project_id = required_text(&payload.project_id, "projectId")?;
    let title = required_text(&payload.title, "title")?;
    let sub_project_id =
        payload.sub_project_id.as_deref().map(str::trim).filter(|value| !value.is_empty());

    repositories::projects::find_by_id(state.db(), project_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch project"))?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    if let Some(sub_project_id) = sub_project_id {
        let sub_project = repositories::projects::find_sub_project(state.db(), sub_project_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch sub-project"))?
            .ok_or_else(|| ApiError::NotFound("Sub-project not found".to_string()))?;
        if sub_project.project_id != project_id {
            return Err(ApiError::BadRequest(
                "Sub-project does not belong to project".to_string(),
            ));
        }
    }

    let due_date = match payload.due_date.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => Some(parse_timestamp(raw).ok_or_else(|| {
            ApiError::BadRequest("dueDate must be an RFC 3339 timestamp or YYYY-MM-DD".to_string())
        })?),
        None => None,
    };

    let task = repositories::tasks::create(
        state.db(),
        repositories::tasks::CreateTask {
            id: &Uuid::new_v4().to_string(),
            project_id,
            sub_project_id,
            title,
            description: payload.description.as_deref(),
            priority: payload.priority.unwrap_or(TaskPriority::Medium),
            due_date,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create task"))?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from_db(task))))
}

async fn update_task_status(
    Path(task_id): Path<String>,
    StaffUser(staff): StaffUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<TaskStatusUpdate>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = completion_pipeline::update_task_status(state.db(), &task_id, payload.status)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update task status"))?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(
        task_id = %task.id,
        status = ?task.status,
        updated_by = %staff.email,
        "Task status updated"
    );

    Ok(Json(TaskResponse::from_db(task)))
}

async fn submit_completion(
    Path(task_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CompletionCreate>,
) -> Result<(StatusCode, Json<CompletionResponse>), ApiError> {
    validate_payload(&payload)?;
    let company_id = user.resolve_company(payload.company_id.as_deref())?;

    let completion = completion_pipeline::submit_completion(
        state.db(),
        SubmitCompletion {
            task_id: &task_id,
            company_id: &company_id,
            completed_by: &user.email,
            note: payload.completion_note.as_deref(),
            actual_hours: payload.actual_hours,
        },
    )
    .await?;

    tracing::info!(
        completion_id = %completion.id,
        task_id = %task_id,
        company_id = %company_id,
        "Task completion submitted"
    );

    Ok((StatusCode::CREATED, Json(CompletionResponse::from_db(completion))))
}

async fn list_completions(
    Path(task_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<CompletionListQuery>,
) -> Result<Json<Vec<CompletionResponse>>, ApiError> {
    let company_id = if user.role.is_staff() {
        params.company_id.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
    } else {
        Some(user.resolve_company(params.company_id.as_deref())?)
    };

    let completions =
        repositories::completions::list_for_task(state.db(), &task_id, company_id.as_deref())
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list completions"))?;

    Ok(Json(completions.into_iter().map(CompletionResponse::from_db).collect()))
}
