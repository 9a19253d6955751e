use crate::db::models::Student;

pub(crate) const COLUMNS: &str =
    "student_identifier, full_name, degree, course, has_attempted, is_active";

/// Locks the roster row until the surrounding transaction ends, so two
/// concurrent logins for the same identifier serialize on the
/// one-time-use check.
pub(crate) async fn find_active_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    identifier: &str,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {COLUMNS} FROM students \
         WHERE student_identifier = $1 AND is_active = TRUE \
         FOR UPDATE"
    ))
    .bind(identifier)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn mark_attempted(
    executor: impl sqlx::PgExecutor<'_>,
    identifier: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE students SET has_attempted = TRUE WHERE student_identifier = $1")
        .bind(identifier)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) struct CreateStudent<'a> {
    pub(crate) student_identifier: &'a str,
    pub(crate) full_name: &'a str,
    pub(crate) degree: Option<&'a str>,
    pub(crate) course: Option<&'a str>,
    pub(crate) is_active: bool,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    student: CreateStudent<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO students (student_identifier, full_name, degree, course, is_active) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(student.student_identifier)
    .bind(student.full_name)
    .bind(student.degree)
    .bind(student.course)
    .bind(student.is_active)
    .execute(executor)
    .await?;
    Ok(())
}

// Read-back for test assertions; the service path goes through the
// locking lookup above.
#[cfg(test)]
pub(crate) async fn find_by_identifier(
    executor: impl sqlx::PgExecutor<'_>,
    identifier: &str,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {COLUMNS} FROM students WHERE student_identifier = $1"
    ))
    .bind(identifier)
    .fetch_optional(executor)
    .await
}
