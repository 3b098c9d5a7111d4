use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::notification::{NotificationQuery, NotificationResponse};

const MAX_LIMIT: i64 = 200;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/:notification_id/read", post(mark_read))
}

async fn list_notifications(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<NotificationQuery>,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let company_id = user.resolve_company(params.company_id.as_deref())?;

    let notifications = repositories::notifications::list_for_company(
        state.db(),
        &company_id,
        params.unread_only,
        params.limit.clamp(1, MAX_LIMIT),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list notifications"))?;

    Ok(Json(notifications.into_iter().map(NotificationResponse::from_db).collect()))
}

async fn mark_read(
    Path(notification_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let mut notification = repositories::notifications::find_by_id(state.db(), &notification_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch notification"))?
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;
    user.ensure_company_access(&notification.company_id)?;

    repositories::notifications::mark_read(state.db(), &notification_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to mark notification read"))?;
    notification.is_read = true;

    Ok(Json(NotificationResponse::from_db(notification)))
}
