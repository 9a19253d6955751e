use sqlx::{Postgres, QueryBuilder};

use crate::db::models::AssignedQuestion;

pub(crate) struct AssignmentRow {
    pub(crate) question_id: i32,
    pub(crate) sequence: Option<i32>,
}

/// Persists the assignment in final display order. The serial primary key
/// records insertion order, which is the canonical ordering on read.
pub(crate) async fn bulk_insert(
    executor: impl sqlx::PgExecutor<'_>,
    session_id: &str,
    rows: &[AssignmentRow],
) -> Result<(), sqlx::Error> {
    if rows.is_empty() {
        return Ok(());
    }

    let mut builder = QueryBuilder::<Postgres>::new(
        "INSERT INTO session_questions (session_id, question_id, sequence) ",
    );
    builder.push_values(rows, |mut b, row| {
        b.push_bind(session_id).push_bind(row.question_id).push_bind(row.sequence);
    });
    builder.build().execute(executor).await?;
    Ok(())
}

pub(crate) async fn list_for_session(
    executor: impl sqlx::PgExecutor<'_>,
    session_id: &str,
) -> Result<Vec<AssignedQuestion>, sqlx::Error> {
    sqlx::query_as::<_, AssignedQuestion>(
        "SELECT
            q.id, q.prompt, q.option_a, q.option_b, q.option_c, q.option_d,
            q.image_url, q.question_group_id, q.is_group_header, q.group_order,
            q.allows_multiple, sq.sequence
         FROM session_questions sq
         INNER JOIN questions q ON q.id = sq.question_id
         WHERE sq.session_id = $1
         ORDER BY sq.id",
    )
    .bind(session_id)
    .fetch_all(executor)
    .await
}

/// Question ids a candidate may answer: the session's assignment minus
/// group headers.
pub(crate) async fn answerable_ids(
    executor: impl sqlx::PgExecutor<'_>,
    session_id: &str,
) -> Result<Vec<i32>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT sq.question_id
         FROM session_questions sq
         INNER JOIN questions q ON q.id = sq.question_id
         WHERE sq.session_id = $1 AND q.is_group_header = FALSE",
    )
    .bind(session_id)
    .fetch_all(executor)
    .await
}
