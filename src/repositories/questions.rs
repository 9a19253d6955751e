use crate::db::models::{AnswerKey, Question};

pub(crate) const COLUMNS: &str = "\
    id, prompt, option_a, option_b, option_c, option_d, correct_option, \
    allows_multiple, is_active, image_url, question_group_id, is_group_header, group_order";

pub(crate) async fn list_active(
    executor: impl sqlx::PgExecutor<'_>,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE is_active = TRUE ORDER BY id"
    ))
    .fetch_all(executor)
    .await
}

pub(crate) async fn answer_keys(
    executor: impl sqlx::PgExecutor<'_>,
    ids: &[i32],
) -> Result<Vec<AnswerKey>, sqlx::Error> {
    sqlx::query_as::<_, AnswerKey>(
        "SELECT id, correct_option, allows_multiple FROM questions WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(executor)
    .await
}

pub(crate) struct CreateQuestion<'a> {
    pub(crate) prompt: &'a str,
    pub(crate) option_a: &'a str,
    pub(crate) option_b: &'a str,
    pub(crate) option_c: &'a str,
    pub(crate) option_d: &'a str,
    pub(crate) correct_option: &'a str,
    pub(crate) allows_multiple: bool,
    pub(crate) is_active: bool,
    pub(crate) image_url: Option<&'a str>,
    pub(crate) question_group_id: Option<i32>,
    pub(crate) is_group_header: bool,
    pub(crate) group_order: Option<i32>,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    question: CreateQuestion<'_>,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO questions (
            prompt, option_a, option_b, option_c, option_d, correct_option,
            allows_multiple, is_active, image_url, question_group_id, is_group_header, group_order
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
        RETURNING id",
    )
    .bind(question.prompt)
    .bind(question.option_a)
    .bind(question.option_b)
    .bind(question.option_c)
    .bind(question.option_d)
    .bind(question.correct_option)
    .bind(question.allows_multiple)
    .bind(question.is_active)
    .bind(question.image_url)
    .bind(question.question_group_id)
    .bind(question.is_group_header)
    .bind(question.group_order)
    .fetch_one(executor)
    .await
}
