use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::TaskCompletion;
use crate::db::types::TaskCompletionStatus;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompletionCreate {
    /// Required for staff callers; ignored for company users.
    #[serde(default)]
    pub(crate) company_id: Option<String>,
    #[serde(default)]
    pub(crate) completion_note: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "actualHours must be non-negative"))]
    pub(crate) actual_hours: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ReviewDecision {
    Approved,
    Rejected,
}

impl ReviewDecision {
    pub(crate) fn as_status(self) -> TaskCompletionStatus {
        match self {
            Self::Approved => TaskCompletionStatus::Approved,
            Self::Rejected => TaskCompletionStatus::Rejected,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompletionReview {
    pub(crate) decision: ReviewDecision,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 10.0, message = "qualityScore must be between 0 and 10"))]
    pub(crate) quality_score: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompletionResponse {
    pub(crate) id: String,
    pub(crate) task_id: String,
    pub(crate) company_id: String,
    pub(crate) completed_by: String,
    pub(crate) completion_note: Option<String>,
    pub(crate) actual_hours: Option<f64>,
    pub(crate) status: TaskCompletionStatus,
    pub(crate) quality_score: Option<f64>,
    pub(crate) reviewed_by: Option<String>,
    pub(crate) completion_date: String,
    pub(crate) approved_at: Option<String>,
}

impl CompletionResponse {
    pub(crate) fn from_db(completion: TaskCompletion) -> Self {
        Self {
            id: completion.id,
            task_id: completion.task_id,
            company_id: completion.company_id,
            completed_by: completion.completed_by,
            completion_note: completion.completion_note,
            actual_hours: completion.actual_hours,
            status: completion.status,
            quality_score: completion.quality_score,
            reviewed_by: completion.reviewed_by,
            completion_date: format_primitive(completion.completion_date),
            approved_at: completion.approved_at.map(format_primitive),
        }
    }
}
