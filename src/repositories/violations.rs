use time::PrimitiveDateTime;

#[cfg(test)]
use crate::db::models::Violation;

/// Violations are append-only; every report lands here even when the
/// session entity is no longer mutable.
pub(crate) async fn append(
    executor: impl sqlx::PgExecutor<'_>,
    session_id: &str,
    reason: &str,
    recorded_at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO violations (session_id, reason, recorded_at) VALUES ($1, $2, $3)")
        .bind(session_id)
        .bind(reason)
        .bind(recorded_at)
        .execute(executor)
        .await?;
    Ok(())
}

// Read-back for test assertions; reports append and never read.
#[cfg(test)]
pub(crate) async fn list_for_session(
    executor: impl sqlx::PgExecutor<'_>,
    session_id: &str,
) -> Result<Vec<Violation>, sqlx::Error> {
    sqlx::query_as::<_, Violation>(
        "SELECT id, session_id, reason, recorded_at FROM violations \
         WHERE session_id = $1 ORDER BY id",
    )
    .bind(session_id)
    .fetch_all(executor)
    .await
}
