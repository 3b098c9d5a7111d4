use serde::Serialize;
use sqlx::FromRow;
use time::{Date, PrimitiveDateTime};

use crate::db::types::{
    AssignmentStatus, CompanyStatus, CompletionStatus, ProjectStatus, TaskCompletionStatus,
    TaskPriority, TaskStatus,
};

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct Company {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: Option<String>,
    pub(crate) status: CompanyStatus,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct Project {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) status: ProjectStatus,
    pub(crate) progress_percentage: i32,
    pub(crate) created_by: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct SubProject {
    pub(crate) id: String,
    pub(crate) project_id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) status: ProjectStatus,
    pub(crate) progress_percentage: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct Task {
    pub(crate) id: String,
    pub(crate) project_id: String,
    pub(crate) sub_project_id: Option<String>,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) status: TaskStatus,
    pub(crate) priority: TaskPriority,
    pub(crate) due_date: Option<PrimitiveDateTime>,
    pub(crate) completed_at: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Assignment row shared by the three levels; `entity_id` is the project,
/// sub-project, or task id depending on the table it came from.
#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct Assignment {
    pub(crate) id: String,
    pub(crate) entity_id: String,
    pub(crate) company_id: String,
    pub(crate) status: AssignmentStatus,
    pub(crate) assigned_by: String,
    pub(crate) assigned_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct TaskCompletion {
    pub(crate) id: String,
    pub(crate) task_id: String,
    pub(crate) company_id: String,
    pub(crate) completed_by: String,
    pub(crate) completion_note: Option<String>,
    pub(crate) actual_hours: Option<f64>,
    pub(crate) status: TaskCompletionStatus,
    pub(crate) quality_score: Option<f64>,
    pub(crate) reviewed_by: Option<String>,
    pub(crate) completion_date: PrimitiveDateTime,
    pub(crate) approved_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct SubProjectReport {
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
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct CompanyDates {
    pub(crate) id: String,
    pub(crate) entity_id: String,
    pub(crate) company_id: String,
    pub(crate) start_date: Option<Date>,
    pub(crate) end_date: Option<Date>,
    pub(crate) is_flexible: bool,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct Notification {
    pub(crate) id: String,
    pub(crate) company_id: String,
    pub(crate) kind: String,
    pub(crate) title: String,
    pub(crate) message: String,
    pub(crate) related_entity_id: Option<String>,
    pub(crate) is_read: bool,
    pub(crate) created_at: PrimitiveDateTime,
}
