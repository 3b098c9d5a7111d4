use sqlx::{PgConnection, PgPool};

use crate::db::models::Notification;

const NOTIFICATION_COLUMNS: &str =
    "id, company_id, kind, title, message, related_entity_id, is_read, created_at";

pub(crate) struct CreateNotification<'a> {
    pub(crate) company_id: &'a str,
    pub(crate) kind: &'a str,
    pub(crate) title: &'a str,
    pub(crate) message: &'a str,
    pub(crate) related_entity_id: Option<&'a str>,
    pub(crate) now: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    conn: &mut PgConnection,
    params: CreateNotification<'_>,
) -> Result<Notification, sqlx::Error> {
    sqlx::query_as::<_, Notification>(&format!(
        "INSERT INTO notifications (
            id, company_id, kind, title, message, related_entity_id, is_read, created_at
         ) VALUES ($1,$2,$3,$4,$5,$6,FALSE,$7)
         RETURNING {NOTIFICATION_COLUMNS}",
    ))
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(params.company_id)
    .bind(params.kind)
    .bind(params.title)
    .bind(params.message)
    .bind(params.related_entity_id)
    .bind(params.now)
    .fetch_one(conn)
    .await
}

pub(crate) async fn list_for_company(
    pool: &PgPool,
    company_id: &str,
    unread_only: bool,
    limit: i64,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(&format!(
        "SELECT {NOTIFICATION_COLUMNS}
         FROM notifications
         WHERE company_id = $1 AND (NOT $2 OR is_read = FALSE)
         ORDER BY created_at DESC
         LIMIT $3",
    ))
    .bind(company_id)
    .bind(unread_only)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    notification_id: &str,
) -> Result<Option<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(&format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1"
    ))
    .bind(notification_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn mark_read(pool: &PgPool, notification_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1")
        .bind(notification_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
