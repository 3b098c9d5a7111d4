use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Company, Project, SubProject, Task};
use crate::db::types::{CompanyStatus, ProjectStatus, TaskPriority, TaskStatus};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompanyCreate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
    #[serde(default)]
    #[validate(email(message = "email must be a valid address"))]
    pub(crate) email: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<CompanyStatus>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompanyListQuery {
    #[serde(default)]
    pub(crate) status: Option<CompanyStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompanyResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: Option<String>,
    pub(crate) status: CompanyStatus,
    pub(crate) created_at: String,
}

impl CompanyResponse {
    pub(crate) fn from_db(company: Company) -> Self {
        Self {
            id: company.id,
            name: company.name,
            email: company.email,
            status: company.status,
            created_at: format_primitive(company.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectCreate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<ProjectStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) status: ProjectStatus,
    pub(crate) progress_percentage: i32,
    pub(crate) created_by: String,
    pub(crate) created_at: String,
}

impl ProjectResponse {
    pub(crate) fn from_db(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            status: project.status,
            progress_percentage: project.progress_percentage,
            created_by: project.created_by,
            created_at: format_primitive(project.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubProjectResponse {
    pub(crate) id: String,
    pub(crate) project_id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) status: ProjectStatus,
    pub(crate) progress_percentage: i32,
    pub(crate) created_at: String,
}

impl SubProjectResponse {
    pub(crate) fn from_db(sub_project: SubProject) -> Self {
        Self {
            id: sub_project.id,
            project_id: sub_project.project_id,
            name: sub_project.name,
            description: sub_project.description,
            status: sub_project.status,
            progress_percentage: sub_project.progress_percentage,
            created_at: format_primitive(sub_project.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TaskCreate {
    #[validate(length(min = 1, message = "projectId must not be empty"))]
    pub(crate) project_id: String,
    #[serde(default)]
    pub(crate) sub_project_id: Option<String>,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) priority: Option<TaskPriority>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    #[serde(default)]
    pub(crate) due_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskStatusUpdate {
    pub(crate) status: TaskStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TaskResponse {
    pub(crate) id: String,
    pub(crate) project_id: String,
    pub(crate) sub_project_id: Option<String>,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) status: TaskStatus,
    pub(crate) priority: TaskPriority,
    pub(crate) due_date: Option<String>,
    pub(crate) completed_at: Option<String>,
    pub(crate) created_at: String,
}

impl TaskResponse {
    pub(crate) fn from_db(task: Task) -> Self {
        Self {
            id: task.id,
            project_id: task.project_id,
            sub_project_id: task.sub_project_id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date.map(format_primitive),
            completed_at: task.completed_at.map(format_primitive),
            created_at: format_primitive(task.created_at),
        }
    }
}
