use axum::extract::{Path, State};
use axum::{routing::post, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::StaffUser;
use crate::api::validation::{validate_payload, JsonBody};
use crate::core::state::AppState;
use crate::schemas::completion::{CompletionResponse, CompletionReview};
use crate::services::completion_pipeline::{self, CompletionError};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/:completion_id/review", post(review_completion))
}

impl From<CompletionError> for ApiError {
    fn from(error: CompletionError) -> Self {
        match error {
            CompletionError::TaskNotFound | CompletionError::CompletionNotFound => {
                ApiError::NotFound(error.to_string())
            }
            CompletionError::NotAssigned => {
                ApiError::Forbidden("Task is not assigned to this company")
            }
            CompletionError::AlreadyReviewed => ApiError::Conflict(error.to_string()),
            CompletionError::Internal(err) => {
                ApiError::internal(err, "Failed to process completion")
            }
        }
    }
}

async fn review_completion(
    Path(completion_id): Path<String>,
    StaffUser(staff): StaffUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CompletionReview>,
) -> Result<Json<CompletionResponse>, ApiError> {
    validate_payload(&payload)?;

    let completion = completion_pipeline::review_completion(
        state.db(),
        &completion_id,
        payload.decision.as_status(),
        payload.quality_score,
        &staff.email,
    )
    .await?;

    tracing::info!(
        completion_id = %completion.id,
        task_id = %completion.task_id,
        decision = ?payload.decision,
        reviewed_by = %staff.email,
        "Task completion reviewed"
    );

    Ok(Json(CompletionResponse::from_db(completion)))
}
