use sqlx::PgPool;

use crate::db::models::TaskCompletion;
use crate::db::types::TaskCompletionStatus;

const COMPLETION_COLUMNS: &str = "id, task_id, company_id, completed_by, completion_note, \
                                  actual_hours, status, quality_score, reviewed_by, \
                                  completion_date, approved_at";

pub(crate) struct CreateCompletion<'a> {
    pub(crate) id: &'a str,
    pub(crate) task_id: &'a str,
    pub(crate) company_id: &'a str,
    pub(crate) completed_by: &'a str,
    pub(crate) completion_note: Option<&'a str>,
    pub(crate) actual_hours: Option<f64>,
    pub(crate) completion_date: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateCompletion<'_>,
) -> Result<TaskCompletion, sqlx::Error> {
    sqlx::query_as::<_, TaskCompletion>(&format!(
        "INSERT INTO task_completions (
            id, task_id, company_id, completed_by, completion_note, actual_hours, status,
            completion_date
         ) VALUES ($1,$2,$3,$4,$5,$6,'pending_approval',$7)
         RETURNING {COMPLETION_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.task_id)
    .bind(params.company_id)
    .bind(params.completed_by)
    .bind(params.completion_note)
    .bind(params.actual_hours)
    .bind(params.completion_date)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    completion_id: &str,
) -> Result<Option<TaskCompletion>, sqlx::Error> {
    sqlx::query_as::<_, TaskCompletion>(&format!(
        "SELECT {COMPLETION_COLUMNS} FROM task_completions WHERE id = $1"
    ))
    .bind(completion_id)
    .fetch_optional(pool)
    .await
}

pub(crate) struct ReviewCompletion<'a> {
    pub(crate) decision: TaskCompletionStatus,
    pub(crate) quality_score: Option<f64>,
    pub(crate) reviewed_by: &'a str,
    pub(crate) now: time::PrimitiveDateTime,
}

/// Applies a review decision. Only rows still awaiting approval change, so a
/// concurrent second review returns `None`.
pub(crate) async fn review(
    pool: &PgPool,
    completion_id: &str,
    params: ReviewCompletion<'_>,
) -> Result<Option<TaskCompletion>, sqlx::Error> {
    sqlx::query_as::<_, TaskCompletion>(&format!(
        "UPDATE task_completions
         SET status = $1,
             quality_score = $2,
             reviewed_by = $3,
             approved_at = CASE WHEN $1 = 'approved'::taskcompletionstatus THEN $4 ELSE NULL END
         WHERE id = $5 AND status = 'pending_approval'
         RETURNING {COMPLETION_COLUMNS}",
    ))
    .bind(params.decision)
    .bind(params.quality_score)
    .bind(params.reviewed_by)
    .bind(params.now)
    .bind(completion_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_for_task(
    pool: &PgPool,
    task_id: &str,
    company_id: Option<&str>,
) -> Result<Vec<TaskCompletion>, sqlx::Error> {
    sqlx::query_as::<_, TaskCompletion>(&format!(
        "SELECT {COMPLETION_COLUMNS}
         FROM task_completions
         WHERE task_id = $1 AND ($2::text IS NULL OR company_id = $2)
         ORDER BY completion_date DESC",
    ))
    .bind(task_id)
    .bind(company_id)
    .fetch_all(pool)
    .await
}
