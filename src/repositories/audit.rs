use time::PrimitiveDateTime;

use crate::db::types::AuditStatus;

pub(crate) struct AuditEntry<'a> {
    pub(crate) session_id: &'a str,
    pub(crate) student_identifier: &'a str,
    pub(crate) status: AuditStatus,
    pub(crate) score: Option<f64>,
    pub(crate) violation_reason: Option<&'a str>,
    pub(crate) logged_at: PrimitiveDateTime,
}

pub(crate) async fn append(
    executor: impl sqlx::PgExecutor<'_>,
    entry: AuditEntry<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO audit_log
            (session_id, student_identifier, status, score, violation_reason, logged_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(entry.session_id)
    .bind(entry.student_identifier)
    .bind(entry.status)
    .bind(entry.score)
    .bind(entry.violation_reason)
    .bind(entry.logged_at)
    .execute(executor)
    .await?;
    Ok(())
}

// Read-back for test assertions; the trail is never consulted at
// decision time.
#[cfg(test)]
pub(crate) async fn count_for_session(
    executor: impl sqlx::PgExecutor<'_>,
    session_id: &str,
    status: AuditStatus,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM audit_log WHERE session_id = $1 AND status = $2")
        .bind(session_id)
        .bind(status)
        .fetch_one(executor)
        .await
}
