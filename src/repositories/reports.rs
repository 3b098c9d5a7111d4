use sqlx::{PgConnection, PgPool};

use crate::db::models::SubProjectReport;

const REPORT_COLUMNS: &str = "id, sub_project_id, company_id, consultant_email, overall_rating, \
                              quality_score, timeliness_score, communication_score, strengths, \
                              areas_for_improvement, recommendations, general_feedback, \
                              task_completion_rate, total_tasks, completed_tasks, delayed_tasks, \
                              created_at, updated_at";

/// Raw task counts for one (sub-project, company) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub(crate) struct TaskCounts {
    pub(crate) total_tasks: i64,
    pub(crate) completed_tasks: i64,
    pub(crate) delayed_tasks: i64,
}

pub(crate) struct RatingFields<'a> {
    pub(crate) overall_rating: i32,
    pub(crate) quality_score: Option<i32>,
    pub(crate) timeliness_score: Option<i32>,
    pub(crate) communication_score: Option<i32>,
    pub(crate) strengths: Option<&'a str>,
    pub(crate) areas_for_improvement: Option<&'a str>,
    pub(crate) recommendations: Option<&'a str>,
    pub(crate) general_feedback: Option<&'a str>,
}

pub(crate) struct CreateReport<'a> {
    pub(crate) id: &'a str,
    pub(crate) sub_project_id: &'a str,
    pub(crate) company_id: &'a str,
    pub(crate) consultant_email: &'a str,
    pub(crate) ratings: RatingFields<'a>,
    pub(crate) task_completion_rate: i32,
    pub(crate) counts: TaskCounts,
    pub(crate) now: time::PrimitiveDateTime,
}

pub(crate) struct UpdateReport {
    pub(crate) overall_rating: Option<i32>,
    pub(crate) quality_score: Option<i32>,
    pub(crate) timeliness_score: Option<i32>,
    pub(crate) communication_score: Option<i32>,
    pub(crate) strengths: Option<String>,
    pub(crate) areas_for_improvement: Option<String>,
    pub(crate) recommendations: Option<String>,
    pub(crate) general_feedback: Option<String>,
    pub(crate) now: time::PrimitiveDateTime,
}

/// Counts the company's active tasks under a sub-project. A task is delayed
/// when it was completed after its due date.
pub(crate) async fn task_counts(
    conn: &mut PgConnection,
    sub_project_id: &str,
    company_id: &str,
) -> Result<TaskCounts, sqlx::Error> {
    sqlx::query_as::<_, TaskCounts>(
        "SELECT COUNT(*) AS total_tasks,
                COUNT(*) FILTER (WHERE t.status = 'completed') AS completed_tasks,
                COUNT(*) FILTER (
                    WHERE t.status = 'completed'
                      AND t.due_date IS NOT NULL
                      AND t.completed_at > t.due_date
                ) AS delayed_tasks
         FROM tasks t
         JOIN task_company_assignments ta ON ta.task_id = t.id
         WHERE t.sub_project_id = $1
           AND ta.company_id = $2
           AND ta.status = 'active'",
    )
    .bind(sub_project_id)
    .bind(company_id)
    .fetch_one(conn)
    .await
}

pub(crate) async fn create(
    conn: &mut PgConnection,
    params: CreateReport<'_>,
) -> Result<SubProjectReport, sqlx::Error> {
    let ratings = params.ratings;
    sqlx::query_as::<_, SubProjectReport>(&format!(
        "INSERT INTO sub_project_completion_reports (
            id, sub_project_id, company_id, consultant_email, overall_rating, quality_score,
            timeliness_score, communication_score, strengths, areas_for_improvement,
            recommendations, general_feedback, task_completion_rate, total_tasks,
            completed_tasks, delayed_tasks, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$17)
         RETURNING {REPORT_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.sub_project_id)
    .bind(params.company_id)
    .bind(params.consultant_email)
    .bind(ratings.overall_rating)
    .bind(ratings.quality_score)
    .bind(ratings.timeliness_score)
    .bind(ratings.communication_score)
    .bind(ratings.strengths)
    .bind(ratings.areas_for_improvement)
    .bind(ratings.recommendations)
    .bind(ratings.general_feedback)
    .bind(params.task_completion_rate)
    .bind(params.counts.total_tasks as i32)
    .bind(params.counts.completed_tasks as i32)
    .bind(params.counts.delayed_tasks as i32)
    .bind(params.now)
    .fetch_one(conn)
    .await
}

pub(crate) async fn find_for_pair(
    conn: &mut PgConnection,
    sub_project_id: &str,
    company_id: &str,
) -> Result<Option<SubProjectReport>, sqlx::Error> {
    sqlx::query_as::<_, SubProjectReport>(&format!(
        "SELECT {REPORT_COLUMNS}
         FROM sub_project_completion_reports
         WHERE sub_project_id = $1 AND company_id = $2",
    ))
    .bind(sub_project_id)
    .bind(company_id)
    .fetch_optional(conn)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    report_id: &str,
) -> Result<Option<SubProjectReport>, sqlx::Error> {
    sqlx::query_as::<_, SubProjectReport>(&format!(
        "SELECT {REPORT_COLUMNS} FROM sub_project_completion_reports WHERE id = $1"
    ))
    .bind(report_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list(
    pool: &PgPool,
    sub_project_id: Option<&str>,
    company_id: Option<&str>,
) -> Result<Vec<SubProjectReport>, sqlx::Error> {
    sqlx::query_as::<_, SubProjectReport>(&format!(
        "SELECT {REPORT_COLUMNS}
         FROM sub_project_completion_reports
         WHERE ($1::text IS NULL OR sub_project_id = $1)
           AND ($2::text IS NULL OR company_id = $2)
         ORDER BY created_at DESC",
    ))
    .bind(sub_project_id)
    .bind(company_id)
    .fetch_all(pool)
    .await
}

/// Edits ratings and feedback in place; the statistics snapshot is never
/// written after creation.
pub(crate) async fn update_feedback(
    pool: &PgPool,
    report_id: &str,
    params: UpdateReport,
) -> Result<Option<SubProjectReport>, sqlx::Error> {
    sqlx::query_as::<_, SubProjectReport>(&format!(
        "UPDATE sub_project_completion_reports SET
            overall_rating = COALESCE($1, overall_rating),
            quality_score = COALESCE($2, quality_score),
            timeliness_score = COALESCE($3, timeliness_score),
            communication_score = COALESCE($4, communication_score),
            strengths = COALESCE($5, strengths),
            areas_for_improvement = COALESCE($6, areas_for_improvement),
            recommendations = COALESCE($7, recommendations),
            general_feedback = COALESCE($8, general_feedback),
            updated_at = $9
         WHERE id = $10
         RETURNING {REPORT_COLUMNS}",
    ))
    .bind(params.overall_rating)
    .bind(params.quality_score)
    .bind(params.timeliness_score)
    .bind(params.communication_score)
    .bind(params.strengths)
    .bind(params.areas_for_improvement)
    .bind(params.recommendations)
    .bind(params.general_feedback)
    .bind(params.now)
    .bind(report_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, report_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sub_project_completion_reports WHERE id = $1")
        .bind(report_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
