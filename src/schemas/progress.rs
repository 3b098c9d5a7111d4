use serde::{Deserialize, Serialize};

use crate::db::types::ProjectStatus;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProgressQuery {
    /// Window length in days, as a string (`"30"`).
    #[serde(default)]
    pub(crate) time_range: Option<String>,
    #[serde(default)]
    pub(crate) project_id: Option<String>,
    #[serde(default)]
    pub(crate) company_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusDistribution {
    pub(crate) pending: i64,
    pub(crate) in_progress: i64,
    pub(crate) completed: i64,
    pub(crate) cancelled: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct MonthlyPoint {
    /// `YYYY-MM`.
    pub(crate) month: String,
    pub(crate) count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompanyOverview {
    pub(crate) total_projects: i64,
    pub(crate) active_projects: i64,
    pub(crate) completed_projects: i64,
    pub(crate) total_tasks: i64,
    pub(crate) completed_tasks: i64,
    pub(crate) in_progress_tasks: i64,
    pub(crate) pending_tasks: i64,
    pub(crate) completion_rate: i64,
    pub(crate) average_quality_score: f64,
    pub(crate) total_hours: f64,
    pub(crate) pending_approvals: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectProgress {
    pub(crate) project_id: String,
    pub(crate) name: String,
    pub(crate) status: ProjectStatus,
    pub(crate) progress_percentage: i32,
    pub(crate) total_tasks: i64,
    pub(crate) completed_tasks: i64,
    pub(crate) completion_rate: i64,
    pub(crate) total_hours: f64,
    pub(crate) average_quality_score: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompanyProgressResponse {
    pub(crate) company_id: String,
    pub(crate) time_range_days: i64,
    pub(crate) overview: CompanyOverview,
    pub(crate) projects: Vec<ProjectProgress>,
    pub(crate) status_distribution: StatusDistribution,
    pub(crate) monthly_trend: Vec<MonthlyPoint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SystemOverview {
    pub(crate) total_companies: i64,
    pub(crate) active_companies: i64,
    pub(crate) total_projects: i64,
    pub(crate) active_projects: i64,
    pub(crate) completed_projects: i64,
    pub(crate) total_tasks: i64,
    pub(crate) completed_tasks: i64,
    pub(crate) completion_rate: i64,
    pub(crate) pending_approvals: i64,
    pub(crate) average_quality_score: f64,
    pub(crate) total_hours: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompanyStats {
    pub(crate) company_id: String,
    pub(crate) company_name: String,
    pub(crate) total_tasks: i64,
    pub(crate) completed_tasks: i64,
    pub(crate) completion_rate: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SystemProgressResponse {
    pub(crate) time_range_days: i64,
    pub(crate) overview: SystemOverview,
    pub(crate) status_distribution: StatusDistribution,
    pub(crate) monthly_trend: Vec<MonthlyPoint>,
    pub(crate) companies: Vec<CompanyStats>,
}
