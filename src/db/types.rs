use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum UserRole {
    Admin,
    MasterAdmin,
    Consultant,
    Firma,
}

impl UserRole {
    /// Roles allowed to mutate assignments, dates, and reports.
    pub(crate) fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::MasterAdmin | Self::Consultant)
    }

    pub(crate) fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::MasterAdmin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "companystatus", rename_all = "lowercase")]
pub(crate) enum CompanyStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "projectstatus", rename_all = "lowercase")]
pub(crate) enum ProjectStatus {
    Planned,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "taskstatus", rename_all = "snake_case")]
pub(crate) enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "taskpriority", rename_all = "lowercase")]
pub(crate) enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "assignmentstatus", rename_all = "lowercase")]
pub(crate) enum AssignmentStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "completionstatus", rename_all = "snake_case")]
pub(crate) enum CompletionStatus {
    InProgress,
    Reported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "taskcompletionstatus", rename_all = "snake_case")]
pub(crate) enum TaskCompletionStatus {
    PendingApproval,
    Approved,
    Rejected,
}

/// The three levels of the assignment graph. Table and column names are
/// derived from the level so every query stays on a closed set of identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum AssignmentLevel {
    #[serde(alias = "projects")]
    Project,
    #[serde(alias = "sub-project", alias = "subProject", alias = "sub_projects")]
    SubProject,
    #[serde(alias = "tasks")]
    Task,
}

impl AssignmentLevel {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::SubProject => "sub_project",
            Self::Task => "task",
        }
    }

    pub(crate) fn entity_table(self) -> &'static str {
        match self {
            Self::Project => "projects",
            Self::SubProject => "sub_projects",
            Self::Task => "tasks",
        }
    }

    pub(crate) fn entity_column(self) -> &'static str {
        match self {
            Self::Project => "project_id",
            Self::SubProject => "sub_project_id",
            Self::Task => "task_id",
        }
    }

    /// Column holding the human readable label of the entity.
    pub(crate) fn label_column(self) -> &'static str {
        match self {
            Self::Project | Self::SubProject => "name",
            Self::Task => "title",
        }
    }

    pub(crate) fn assignment_table(self) -> &'static str {
        match self {
            Self::Project => "project_company_assignments",
            Self::SubProject => "sub_project_company_assignments",
            Self::Task => "task_company_assignments",
        }
    }

    pub(crate) fn dates_table(self) -> &'static str {
        match self {
            Self::Project => "project_company_dates",
            Self::SubProject => "sub_project_company_dates",
            Self::Task => "task_company_dates",
        }
    }
}
