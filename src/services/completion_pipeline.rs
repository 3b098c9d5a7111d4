use anyhow::Context;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::core::metrics;
use crate::core::time::primitive_now_utc;
use crate::db::models::{SubProjectReport, Task, TaskCompletion};
use crate::db::types::{AssignmentLevel, TaskCompletionStatus, TaskStatus};
use crate::repositories;
use crate::repositories::reports::{RatingFields, TaskCounts};
use crate::services::rates;

pub(crate) const REPORT_NOTIFICATION_KIND: &str = "sub_project_report";

#[derive(Debug, Error)]
pub(crate) enum CompletionError {
    #[error("Task not found")]
    TaskNotFound,
    #[error("Task is not assigned to this company")]
    NotAssigned,
    #[error("Completion not found")]
    CompletionNotFound,
    #[error("Completion has already been reviewed")]
    AlreadyReviewed,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub(crate) enum ReportError {
    #[error("Active sub-project assignment not found")]
    AssignmentNotFound,
    #[error("A report already exists for this sub-project and company")]
    AlreadyExists,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub(crate) struct SubmitCompletion<'a> {
    pub(crate) task_id: &'a str,
    pub(crate) company_id: &'a str,
    pub(crate) completed_by: &'a str,
    pub(crate) note: Option<&'a str>,
    pub(crate) actual_hours: Option<f64>,
}

/// Records a completion claim. New rows always wait for review.
pub(crate) async fn submit_completion(
    pool: &PgPool,
    params: SubmitCompletion<'_>,
) -> Result<TaskCompletion, CompletionError> {
    repositories::tasks::find_by_id(pool, params.task_id)
        .await
        .context("Failed to fetch task")?
        .ok_or(CompletionError::TaskNotFound)?;

    let assigned = repositories::assignments::has_active(
        pool,
        AssignmentLevel::Task,
        params.task_id,
        params.company_id,
    )
    .await
    .context("Failed to check task assignment")?;
    if !assigned {
        return Err(CompletionError::NotAssigned);
    }

    let completion = repositories::completions::create(
        pool,
        repositories::completions::CreateCompletion {
            id: &Uuid::new_v4().to_string(),
            task_id: params.task_id,
            company_id: params.company_id,
            completed_by: params.completed_by,
            completion_note: params.note,
            actual_hours: params.actual_hours,
            completion_date: primitive_now_utc(),
        },
    )
    .await
    .context("Failed to create completion")?;

    Ok(completion)
}

pub(crate) async fn review_completion(
    pool: &PgPool,
    completion_id: &str,
    decision: TaskCompletionStatus,
    quality_score: Option<f64>,
    reviewed_by: &str,
) -> Result<TaskCompletion, CompletionError> {
    let existing = repositories::completions::find_by_id(pool, completion_id)
        .await
        .context("Failed to fetch completion")?
        .ok_or(CompletionError::CompletionNotFound)?;
    if existing.status != TaskCompletionStatus::PendingApproval {
        return Err(CompletionError::AlreadyReviewed);
    }

    repositories::completions::review(
        pool,
        completion_id,
        repositories::completions::ReviewCompletion {
            decision,
            quality_score,
            reviewed_by,
            now: primitive_now_utc(),
        },
    )
    .await
    .context("Failed to review completion")?
    .ok_or(CompletionError::AlreadyReviewed)
}

/// Moves a task to `status` and refreshes the review flags of its
/// sub-project in the same transaction.
pub(crate) async fn update_task_status(
    pool: &PgPool,
    task_id: &str,
    status: TaskStatus,
) -> anyhow::Result<Option<Task>> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let Some(task) =
        repositories::tasks::update_status(&mut *tx, task_id, status, primitive_now_utc())
            .await
            .context("Failed to update task status")?
    else {
        return Ok(None);
    };

    if let Some(sub_project_id) = task.sub_project_id.as_deref() {
        repositories::assignments::recompute_review_flags(&mut *tx, sub_project_id)
            .await
            .context("Failed to recompute review flags")?;
    }

    tx.commit().await.context("Failed to commit task status")?;
    Ok(Some(task))
}

pub(crate) struct NewReport<'a> {
    pub(crate) sub_project_id: &'a str,
    pub(crate) company_id: &'a str,
    pub(crate) consultant_email: &'a str,
    pub(crate) ratings: RatingFields<'a>,
}

/// Frozen completion rate for a report snapshot.
pub(crate) fn snapshot_rate(counts: &TaskCounts) -> i32 {
    rates::percentage(counts.completed_tasks, counts.total_tasks) as i32
}

/// Creates the single evaluation report for a (sub-project, company) pair,
/// closes the assignment, and notifies the company.
pub(crate) async fn create_report(
    pool: &PgPool,
    params: NewReport<'_>,
) -> Result<SubProjectReport, ReportError> {
    let sub_project = repositories::projects::find_sub_project(pool, params.sub_project_id)
        .await
        .context("Failed to fetch sub-project")?
        .ok_or(ReportError::AssignmentNotFound)?;

    let assigned = repositories::assignments::has_active(
        pool,
        AssignmentLevel::SubProject,
        params.sub_project_id,
        params.company_id,
    )
    .await
    .context("Failed to check sub-project assignment")?;
    if !assigned {
        return Err(ReportError::AssignmentNotFound);
    }

    let now = primitive_now_utc();
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let existing =
        repositories::reports::find_for_pair(&mut *tx, params.sub_project_id, params.company_id)
            .await
            .context("Failed to check existing report")?;
    if existing.is_some() {
        return Err(ReportError::AlreadyExists);
    }

    let counts =
        repositories::reports::task_counts(&mut *tx, params.sub_project_id, params.company_id)
            .await
            .context("Failed to count sub-project tasks")?;

    let report = repositories::reports::create(
        &mut *tx,
        repositories::reports::CreateReport {
            id: &Uuid::new_v4().to_string(),
            sub_project_id: params.sub_project_id,
            company_id: params.company_id,
            consultant_email: params.consultant_email,
            ratings: params.ratings,
            task_completion_rate: snapshot_rate(&counts),
            counts,
            now,
        },
    )
    .await;
    let report = match report {
        Ok(report) => report,
        Err(err) if crate::db::is_unique_violation(&err) => {
            return Err(ReportError::AlreadyExists);
        }
        Err(err) => return Err(anyhow::Error::new(err).context("Failed to create report").into()),
    };

    repositories::assignments::mark_reported(&mut *tx, params.sub_project_id, params.company_id)
        .await
        .context("Failed to mark assignment reported")?;

    let message = format!(
        "Your work on \"{}\" has been evaluated: {}% of tasks completed, overall rating {}/10.",
        sub_project.name, report.task_completion_rate, report.overall_rating
    );
    repositories::notifications::create(
        &mut *tx,
        repositories::notifications::CreateNotification {
            company_id: params.company_id,
            kind: REPORT_NOTIFICATION_KIND,
            title: "Sub-project evaluation available",
            message: &message,
            related_entity_id: Some(params.sub_project_id),
            now,
        },
    )
    .await
    .context("Failed to enqueue report notification")?;

    tx.commit().await.context("Failed to commit report")?;

    metrics::record_report_created();
    tracing::info!(
        report_id = %report.id,
        sub_project_id = params.sub_project_id,
        company_id = params.company_id,
        total_tasks = counts.total_tasks,
        completed_tasks = counts.completed_tasks,
        delayed_tasks = counts.delayed_tasks,
        "Sub-project report created"
    );

    Ok(report)
}
