//! Read-only dashboard rollups. Each view fans its independent aggregate
//! queries out concurrently and then applies the shared rounding rules.

use anyhow::Context;
use sqlx::PgPool;
use thiserror::Error;
use time::Date;

use crate::core::config::ProgressSettings;
use crate::core::time::{
    month_label, month_start, primitive_now_utc, trailing_months, window_start,
};
use crate::repositories::progress::{self as queries, MonthCount, Scope, TaskStatusCounts};
use crate::schemas::progress::{
    CompanyOverview, CompanyProgressResponse, CompanyStats, MonthlyPoint, ProjectProgress,
    StatusDistribution, SystemOverview, SystemProgressResponse,
};
use crate::services::rates::{one_decimal, percentage, two_decimals};

const MAX_TIME_RANGE_DAYS: i64 = 3650;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("timeRange must be a whole number of days between 1 and {MAX_TIME_RANGE_DAYS}")]
pub(crate) struct InvalidTimeRange;

/// Window length in days; a missing or blank value falls back to `default_days`.
pub(crate) fn parse_time_range(
    raw: Option<&str>,
    default_days: i64,
) -> Result<i64, InvalidTimeRange> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(default_days);
    };
    let days = raw.parse::<i64>().map_err(|_| InvalidTimeRange)?;
    if (1..=MAX_TIME_RANGE_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(InvalidTimeRange)
    }
}

/// Expands sparse per-month counts onto every bucket; empty months are 0.
pub(crate) fn fill_months(buckets: &[(Date, Date)], counts: &[MonthCount]) -> Vec<MonthlyPoint> {
    buckets
        .iter()
        .map(|(start, _)| MonthlyPoint {
            month: month_label(*start),
            count: counts
                .iter()
                .find(|row| month_start(row.month) == *start)
                .map(|row| row.count)
                .unwrap_or(0),
        })
        .collect()
}

fn bucket_range(buckets: &[(Date, Date)], today: Date) -> (Date, Date) {
    match (buckets.first(), buckets.last()) {
        (Some((from, _)), Some((_, to))) => (*from, *to),
        _ => {
            let current = month_start(today);
            (current, current)
        }
    }
}

fn distribution(counts: TaskStatusCounts) -> StatusDistribution {
    StatusDistribution {
        pending: counts.pending,
        in_progress: counts.in_progress,
        completed: counts.completed,
        cancelled: counts.cancelled,
    }
}

pub(crate) async fn company_progress(
    pool: &PgPool,
    settings: &ProgressSettings,
    company_id: &str,
    project_id: Option<&str>,
    days: i64,
) -> anyhow::Result<CompanyProgressResponse> {
    let now = primitive_now_utc();
    let buckets = trailing_months(now.date(), settings.company_months);
    let (from, to) = bucket_range(&buckets, now.date());
    let scope =
        Scope { company_id: Some(company_id), project_id, since: Some(window_start(now, days)) };

    let (projects, tasks, completions, pending_approvals, all_tasks, project_rows, monthly) =
        tokio::try_join!(
            queries::project_counts(pool, scope),
            queries::task_status_counts(pool, scope),
            queries::approved_completions(pool, scope),
            queries::pending_approvals(pool, Some(company_id)),
            queries::task_status_counts(pool, scope.without_window()),
            queries::company_project_progress(pool, company_id, project_id),
            queries::monthly_approved_completions(pool, scope.without_window(), from, to),
        )
        .context("Failed to gather company progress")?;

    let overview = CompanyOverview {
        total_projects: projects.total,
        active_projects: projects.active,
        completed_projects: projects.completed,
        total_tasks: tasks.total,
        completed_tasks: tasks.completed,
        in_progress_tasks: tasks.in_progress,
        pending_tasks: tasks.pending,
        completion_rate: percentage(tasks.completed, tasks.total),
        average_quality_score: one_decimal(completions.average_quality),
        total_hours: two_decimals(completions.total_hours),
        pending_approvals,
    };

    let projects = project_rows
        .into_iter()
        .map(|row| ProjectProgress {
            completion_rate: percentage(row.completed_tasks, row.total_tasks),
            total_hours: two_decimals(row.total_hours),
            average_quality_score: one_decimal(row.average_quality),
            project_id: row.project_id,
            name: row.name,
            status: row.status,
            progress_percentage: row.progress_percentage,
            total_tasks: row.total_tasks,
            completed_tasks: row.completed_tasks,
        })
        .collect();

    Ok(CompanyProgressResponse {
        company_id: company_id.to_string(),
        time_range_days: days,
        overview,
        projects,
        status_distribution: distribution(all_tasks),
        monthly_trend: fill_months(&buckets, &monthly),
    })
}

pub(crate) async fn system_progress(
    pool: &PgPool,
    settings: &ProgressSettings,
    company_id: Option<&str>,
    project_id: Option<&str>,
    days: i64,
) -> anyhow::Result<SystemProgressResponse> {
    let now = primitive_now_utc();
    let since = window_start(now, days);
    let buckets = trailing_months(now.date(), settings.system_months);
    let (from, to) = bucket_range(&buckets, now.date());
    let scope = Scope { company_id, project_id, since: Some(since) };

    let (companies, projects, tasks, completions, pending_approvals, all_tasks, monthly, leaders) =
        tokio::try_join!(
            queries::company_counts(pool, Some(since)),
            queries::project_counts(pool, scope),
            queries::task_status_counts(pool, scope),
            queries::approved_completions(pool, scope),
            queries::pending_approvals(pool, company_id),
            queries::task_status_counts(pool, scope.without_window()),
            queries::monthly_created_tasks(pool, scope.without_window(), from, to),
            queries::company_progress(pool, scope.without_window()),
        )
        .context("Failed to gather system progress")?;

    let overview = SystemOverview {
        total_companies: companies.total,
        active_companies: companies.active,
        total_projects: projects.total,
        active_projects: projects.active,
        completed_projects: projects.completed,
        total_tasks: tasks.total,
        completed_tasks: tasks.completed,
        completion_rate: percentage(tasks.completed, tasks.total),
        pending_approvals,
        average_quality_score: one_decimal(completions.average_quality),
        total_hours: two_decimals(completions.total_hours),
    };

    let companies = leaders
        .into_iter()
        .map(|row| CompanyStats {
            completion_rate: percentage(row.completed_tasks, row.total_tasks),
            company_id: row.company_id,
            company_name: row.company_name,
            total_tasks: row.total_tasks,
            completed_tasks: row.completed_tasks,
        })
        .collect();

    Ok(SystemProgressResponse {
        time_range_days: days,
        overview,
        status_distribution: distribution(all_tasks),
        monthly_trend: fill_months(&buckets, &monthly),
        companies,
    })
}
