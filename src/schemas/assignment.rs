use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::types::{AssignmentLevel, AssignmentStatus, CompanyStatus, CompletionStatus};
use crate::repositories::assignments::{AssignmentReportRow, SubProjectAssignmentView};

/// One successfully written (entity, company) pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssignmentResult {
    pub(crate) assignment_id: String,
    pub(crate) level: AssignmentLevel,
    pub(crate) entity_id: String,
    pub(crate) company_id: String,
    pub(crate) status: AssignmentStatus,
    /// `created` or `updated`.
    pub(crate) action: &'static str,
}

/// A parent-level assignment created or reactivated by the cascade.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AutoAssignmentResult {
    pub(crate) level: AssignmentLevel,
    pub(crate) entity_id: String,
    pub(crate) company_id: String,
    pub(crate) triggered_by: String,
    pub(crate) action: &'static str,
}

/// Per-item failure inside a bulk call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ItemError {
    pub(crate) entity_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) company_id: Option<String>,
    pub(crate) message: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompanyAssignmentInput {
    #[validate(length(min = 1, message = "companyId must not be empty"))]
    pub(crate) company_id: String,
    #[serde(default = "default_status")]
    pub(crate) status: AssignmentStatus,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubProjectAssignmentsRequest {
    #[validate(nested)]
    pub(crate) assignments: Vec<CompanyAssignmentInput>,
    #[serde(default = "default_true")]
    pub(crate) auto_assign_parent: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubProjectAssignmentsResponse {
    pub(crate) success: bool,
    pub(crate) results: Vec<AssignmentResult>,
    pub(crate) auto_assignments: Vec<AutoAssignmentResult>,
    pub(crate) errors: Vec<ItemError>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EmbeddedCompany {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: Option<String>,
    pub(crate) status: CompanyStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubProjectAssignmentResponse {
    pub(crate) id: String,
    pub(crate) sub_project_id: String,
    pub(crate) company: EmbeddedCompany,
    pub(crate) status: AssignmentStatus,
    pub(crate) assigned_by: String,
    pub(crate) assigned_at: String,
    pub(crate) completion_status: CompletionStatus,
    pub(crate) consultant_review_required: bool,
    pub(crate) all_tasks_completed: bool,
}

impl SubProjectAssignmentResponse {
    pub(crate) fn from_view(view: SubProjectAssignmentView) -> Self {
        Self {
            id: view.id,
            sub_project_id: view.sub_project_id,
            company: EmbeddedCompany {
                id: view.company_id,
                name: view.company_name,
                email: view.company_email,
                status: view.company_status,
            },
            status: view.status,
            assigned_by: view.assigned_by,
            assigned_at: format_primitive(view.assigned_at),
            completion_status: view.completion_status,
            consultant_review_required: view.consultant_review_required,
            all_tasks_completed: view.all_tasks_completed,
        }
    }
}

/// Row of the read-only `generate_assignment_report` listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssignmentReportItem {
    pub(crate) assignment_id: String,
    pub(crate) level: AssignmentLevel,
    pub(crate) entity_id: String,
    pub(crate) entity_name: String,
    pub(crate) company_id: String,
    pub(crate) company_name: String,
    pub(crate) status: AssignmentStatus,
    pub(crate) assigned_by: String,
    pub(crate) assigned_at: String,
}

impl AssignmentReportItem {
    pub(crate) fn from_row(level: AssignmentLevel, row: AssignmentReportRow) -> Self {
        Self {
            assignment_id: row.id,
            level,
            entity_id: row.entity_id,
            entity_name: row.entity_name,
            company_id: row.company_id,
            company_name: row.company_name,
            status: row.status,
            assigned_by: row.assigned_by,
            assigned_at: format_primitive(row.assigned_at),
        }
    }
}

pub(crate) const fn default_status() -> AssignmentStatus {
    AssignmentStatus::Active
}

pub(crate) const fn default_true() -> bool {
    true
}
