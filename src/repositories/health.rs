use std::time::{Duration, Instant};

use sqlx::PgPool;

/// Round-trips a trivial query and reports how long it took.
pub(crate) async fn ping(pool: &PgPool) -> Result<Duration, sqlx::Error> {
    let started = Instant::now();
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(started.elapsed())
}
