use time::PrimitiveDateTime;

use crate::db::models::ExamSession;
use crate::db::types::SessionStatus;

pub(crate) const COLUMNS: &str = "\
    session_id, student_identifier, student_name, degree, course, status, \
    started_at, expires_at, ended_at, score, violation_reason";

pub(crate) struct CreateSession<'a> {
    pub(crate) session_id: &'a str,
    pub(crate) student_identifier: &'a str,
    pub(crate) student_name: &'a str,
    pub(crate) degree: &'a str,
    pub(crate) course: &'a str,
    pub(crate) status: SessionStatus,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) expires_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    session: CreateSession<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO sessions (
            session_id, student_identifier, student_name, degree, course,
            status, started_at, expires_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)",
    )
    .bind(session.session_id)
    .bind(session.student_identifier)
    .bind(session.student_name)
    .bind(session.degree)
    .bind(session.course)
    .bind(session.status)
    .bind(session.started_at)
    .bind(session.expires_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    session_id: &str,
) -> Result<Option<ExamSession>, sqlx::Error> {
    sqlx::query_as::<_, ExamSession>(&format!(
        "SELECT {COLUMNS} FROM sessions WHERE session_id = $1"
    ))
    .bind(session_id)
    .fetch_optional(executor)
    .await
}

/// Locks the session row for the duration of the transaction; every
/// status-changing operation goes through this first.
pub(crate) async fn find_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    session_id: &str,
) -> Result<Option<ExamSession>, sqlx::Error> {
    sqlx::query_as::<_, ExamSession>(&format!(
        "SELECT {COLUMNS} FROM sessions WHERE session_id = $1 FOR UPDATE"
    ))
    .bind(session_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn complete(
    executor: impl sqlx::PgExecutor<'_>,
    session_id: &str,
    score: f64,
    ended_at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE sessions SET status = $1, score = $2, ended_at = $3 WHERE session_id = $4")
        .bind(SessionStatus::Completed)
        .bind(score)
        .bind(ended_at)
        .bind(session_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn terminate(
    executor: impl sqlx::PgExecutor<'_>,
    session_id: &str,
    reason: &str,
    ended_at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE sessions SET status = $1, violation_reason = $2, ended_at = $3 \
         WHERE session_id = $4",
    )
    .bind(SessionStatus::Terminated)
    .bind(reason)
    .bind(ended_at)
    .bind(session_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn count_active(executor: impl sqlx::PgExecutor<'_>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE status = $1")
        .bind(SessionStatus::Active)
        .fetch_one(executor)
        .await
}
