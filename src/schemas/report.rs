use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::SubProjectReport;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReportCreate {
    #[validate(length(min = 1, message = "subProjectId must not be empty"))]
    pub(crate) sub_project_id: String,
    #[validate(length(min = 1, message = "companyId must not be empty"))]
    pub(crate) company_id: String,
    #[serde(default)]
    #[validate(
        required(message = "overallRating is required"),
        range(min = 0, max = 10, message = "overallRating must be between 0 and 10")
    )]
    pub(crate) overall_rating: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0, max = 10, message = "qualityScore must be between 0 and 10"))]
    pub(crate) quality_score: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0, max = 10, message = "timelinessScore must be between 0 and 10"))]
    pub(crate) timeliness_score: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0, max = 10, message = "communicationScore must be between 0 and 10"))]
    pub(crate) communication_score: Option<i32>,
    #[serde(default)]
    pub(crate) strengths: Option<String>,
    #[serde(default)]
    pub(crate) areas_for_improvement: Option<String>,
    #[serde(default)]
    pub(crate) recommendations: Option<String>,
    #[serde(default)]
    pub(crate) general_feedback: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReportUpdate {
    #[serde(default)]
    #[validate(range(min = 0, max = 10, message = "overallRating must be between 0 and 10"))]
    pub(crate) overall_rating: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0, max = 10, message = "qualityScore must be between 0 and 10"))]
    pub(crate) quality_score: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0, max = 10, message = "timelinessScore must be between 0 and 10"))]
    pub(crate) timeliness_score: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0, max = 10, message = "communicationScore must be between 0 and 10"))]
    pub(crate) communication_score: Option<i32>,
    #[serde(default)]
    pub(crate) strengths: Option<String>,
    #[serde(default)]
    pub(crate) areas_for_improvement: Option<String>,
    #[serde(default)]
    pub(crate) recommendations: Option<String>,
    #[serde(default)]
    pub(crate) general_feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReportListQuery {
    #[serde(default)]
    pub(crate) sub_project_id: Option<String>,
    #[serde(default)]
    pub(crate) company_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReportResponse {
    pub(crate) id: String,
    pub(crate) sub_project_id: String,
    pub(crate) company_id: String,
    pub(crate) consultant_email: String,
    pub(crate) overall_rating: i32,
    pub(crate) quality_score: Option<i32>,
    pub(crate) timeliness_score: Option<i32>,
    pub(crate) communication_score: Option<i32>,
    pub(crate) strengths: Option<String>,
    pub(crate) areas_for_improvement: Option<String>,
    pub(crate) recommendations: Option<String>,
    pub(crate) general_feedback: Option<String>,
    pub(crate) task_completion_rate: i32,
    pub(crate) total_tasks: i32,
    pub(crate) completed_tasks: i32,
    pub(crate) delayed_tasks: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ReportResponse {
    pub(crate) fn from_db(report: SubProjectReport) -> Self {
        Self {
            id: report.id,
            sub_project_id: report.sub_project_id,
            company_id: report.company_id,
            consultant_email: report.consultant_email,
            overall_rating: report.overall_rating,
            quality_score: report.quality_score,
            timeliness_score: report.timeliness_score,
            communication_score: report.communication_score,
            strengths: report.strengths,
            areas_for_improvement: report.areas_for_improvement,
            recommendations: report.recommendations,
            general_feedback: report.general_feedback,
            task_completion_rate: report.task_completion_rate,
            total_tasks: report.total_tasks,
            completed_tasks: report.completed_tasks,
            delayed_tasks: report.delayed_tasks,
            created_at: format_primitive(report.created_at),
            updated_at: format_primitive(report.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportCreatedResponse {
    pub(crate) success: bool,
    pub(crate) report: ReportResponse,
    pub(crate) message: String,
}
