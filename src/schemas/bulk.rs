use serde::{Deserialize, Serialize};

use crate::db::types::{AssignmentLevel, AssignmentStatus};
use crate::schemas::assignment::{default_status, default_true, AutoAssignmentResult, ItemError};

/// `POST /bulk-operations` body. Parsed from a raw JSON value so an unknown
/// `operation` or a malformed `data` object is reported as a 400.
#[derive(Debug, Deserialize)]
#[serde(tag = "operation", content = "data", rename_all = "snake_case")]
pub(crate) enum BulkOperationRequest {
    AssignProjectsToCompanies(AssignProjectsData),
    AssignSubProjectsToCompanies(AssignSubProjectsData),
    AssignTasksToCompanies(AssignTasksData),
    ChangeAssignmentStatus(ChangeStatusData),
    GenerateAssignmentReport(AssignmentReportData),
}

impl BulkOperationRequest {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::AssignProjectsToCompanies(_) => "assign_projects_to_companies",
            Self::AssignSubProjectsToCompanies(_) => "assign_sub_projects_to_companies",
            Self::AssignTasksToCompanies(_) => "assign_tasks_to_companies",
            Self::ChangeAssignmentStatus(_) => "change_assignment_status",
            Self::GenerateAssignmentReport(_) => "generate_assignment_report",
        }
    }
}

/// Fields shared by the three assign operations.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssignOptions {
    pub(crate) company_ids: Vec<String>,
    #[serde(default = "default_status")]
    pub(crate) status: AssignmentStatus,
    #[serde(default = "default_true")]
    pub(crate) auto_assign_parent: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssignProjectsData {
    pub(crate) project_ids: Vec<String>,
    #[serde(flatten)]
    pub(crate) options: AssignOptions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssignSubProjectsData {
    pub(crate) sub_project_ids: Vec<String>,
    #[serde(flatten)]
    pub(crate) options: AssignOptions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssignTasksData {
    pub(crate) task_ids: Vec<String>,
    #[serde(flatten)]
    pub(crate) options: AssignOptions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChangeStatusData {
    pub(crate) level: AssignmentLevel,
    pub(crate) entity_ids: Vec<String>,
    pub(crate) company_ids: Vec<String>,
    pub(crate) status: AssignmentStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssignmentReportData {
    #[serde(default = "default_report_level")]
    pub(crate) level: AssignmentLevel,
    #[serde(default)]
    pub(crate) entity_ids: Vec<String>,
    #[serde(default)]
    pub(crate) company_ids: Vec<String>,
}

const fn default_report_level() -> AssignmentLevel {
    AssignmentLevel::Project
}

#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct BulkSummary {
    pub(crate) total: usize,
    pub(crate) successful: usize,
    pub(crate) failed: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BulkOperationResponse<T: Serialize> {
    pub(crate) success: bool,
    pub(crate) operation: &'static str,
    pub(crate) results: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) auto_assignments: Option<Vec<AutoAssignmentResult>>,
    pub(crate) errors: Vec<ItemError>,
    pub(crate) summary: BulkSummary,
}
