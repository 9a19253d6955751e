use sqlx::{Postgres, QueryBuilder};

#[cfg(test)]
use crate::db::models::Response;

pub(crate) struct ResponseRow {
    pub(crate) question_id: i32,
    pub(crate) selected_option: Option<String>,
    pub(crate) is_correct: bool,
    pub(crate) partial_score: Option<f64>,
}

pub(crate) async fn delete_for_session(
    executor: impl sqlx::PgExecutor<'_>,
    session_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM responses WHERE session_id = $1")
        .bind(session_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn bulk_insert(
    executor: impl sqlx::PgExecutor<'_>,
    session_id: &str,
    rows: &[ResponseRow],
) -> Result<(), sqlx::Error> {
    if rows.is_empty() {
        return Ok(());
    }

    let mut builder = QueryBuilder::<Postgres>::new(
        "INSERT INTO responses (session_id, question_id, selected_option, is_correct, partial_score) ",
    );
    builder.push_values(rows, |mut b, row| {
        b.push_bind(session_id)
            .push_bind(row.question_id)
            .push_bind(row.selected_option.as_deref())
            .push_bind(row.is_correct)
            .push_bind(row.partial_score);
    });
    builder.build().execute(executor).await?;
    Ok(())
}

// Read-back for test assertions; the submit path only writes.
#[cfg(test)]
pub(crate) async fn list_for_session(
    executor: impl sqlx::PgExecutor<'_>,
    session_id: &str,
) -> Result<Vec<Response>, sqlx::Error> {
    sqlx::query_as::<_, Response>(
        "SELECT question_id, selected_option, is_correct, partial_score \
         FROM responses WHERE session_id = $1 ORDER BY question_id",
    )
    .bind(session_id)
    .fetch_all(executor)
    .await
}
