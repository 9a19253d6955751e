use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::SeedableRng;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use time::{Duration, PrimitiveDateTime};
use uuid::Uuid;

use crate::core::config::ExamSettings;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::db::models::ExamSession;
use crate::db::types::{AuditStatus, SessionStatus};
use crate::repositories::{
    audit, questions, responses, session_questions, sessions, students, violations,
};
use crate::schemas::session::{
    AnswerSubmission, LoginData, LoginRequest, QuestionData, SessionStatusData, SubmitData,
};
use crate::services::{ordering, scoring};

pub(crate) const EXPIRY_REASON: &str = "Session expired";

#[derive(Debug, Error)]
pub(crate) enum LifecycleError {
    /// Credential failure; the caller must re-authenticate.
    #[error("{0}")]
    Auth(String),
    /// Request is well-formed but not acceptable in the session's state.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    /// Store-level failure, surfaced as retryable.
    #[error("database error: {0}")]
    Infra(#[from] sqlx::Error),
    #[error("{0}")]
    Unavailable(String),
}

const SESSION_NOT_FOUND: &str =
    "Session Not Found. The exam session could not be found. Please log in again.";

fn normalized_name(value: &str) -> String {
    value.trim().to_lowercase()
}

fn fallback<'a>(claimed: &'a str, roster: Option<&'a str>) -> &'a str {
    let trimmed = claimed.trim();
    if trimmed.is_empty() {
        roster.unwrap_or("")
    } else {
        trimmed
    }
}

/// Authenticates the candidate, burns the roster entry's single attempt and
/// persists the session with its randomized assignment, atomically.
pub(crate) async fn create_session(
    pool: &PgPool,
    exam: &ExamSettings,
    payload: LoginRequest,
) -> Result<LoginData, LifecycleError> {
    if payload.exam_password.is_empty() {
        return Err(LifecycleError::Auth(
            "Exam Password Required. Please enter the exam password to proceed.".to_string(),
        ));
    }
    if payload.exam_password != exam.exam_password {
        return Err(LifecycleError::Auth(
            "Incorrect Exam Password. The password you entered is incorrect. \
             Please check and try again."
                .to_string(),
        ));
    }

    let identifier = payload.student_id.trim().to_string();
    if identifier.is_empty() {
        return Err(LifecycleError::Validation(
            "College ID Required. Please enter your College ID to proceed.".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let student = students::find_active_for_update(&mut *tx, &identifier)
        .await?
        .ok_or_else(|| {
            LifecycleError::Auth(
                "Incorrect College ID. The provided College ID is not registered in the \
                 system. Please verify your College ID and try again."
                    .to_string(),
            )
        })?;

    let claimed = normalized_name(&payload.name);
    if claimed.is_empty() || claimed != normalized_name(&student.full_name) {
        return Err(LifecycleError::Auth(
            "Name and College ID do not match our records. Please enter the exact name \
             registered for this College ID."
                .to_string(),
        ));
    }

    if student.has_attempted {
        return Err(LifecycleError::Auth(
            "College ID Already Used. This College ID has already been used to attempt the \
             exam. Each student can only attempt the exam once."
                .to_string(),
        ));
    }

    let bank = questions::list_active(&mut *tx).await?;
    if bank.is_empty() {
        return Err(LifecycleError::Unavailable(
            "Question Bank Empty. No questions are available in the system. \
             Please contact support."
                .to_string(),
        ));
    }

    let mut rng = StdRng::from_entropy();
    let assignment = ordering::randomize_assignment(bank, &mut rng);
    let question_count = assignment.iter().filter(|item| item.sequence.is_some()).count();

    let session_id = Uuid::new_v4().to_string();
    let now = primitive_now_utc();
    let expires_at = now + Duration::minutes(exam.session_duration_minutes as i64);

    let student_name = fallback(&payload.name, Some(&student.full_name)).to_string();
    let degree = fallback(&payload.degree, student.degree.as_deref()).to_string();
    let course = fallback(&payload.course, student.course.as_deref()).to_string();

    sessions::create(
        &mut *tx,
        sessions::CreateSession {
            session_id: &session_id,
            student_identifier: &student.student_identifier,
            student_name: &student_name,
            degree: &degree,
            course: &course,
            status: SessionStatus::Active,
            started_at: now,
            expires_at,
        },
    )
    .await?;

    students::mark_attempted(&mut *tx, &student.student_identifier).await?;

    let rows: Vec<session_questions::AssignmentRow> = assignment
        .iter()
        .map(|item| session_questions::AssignmentRow {
            question_id: item.question.id,
            sequence: item.sequence,
        })
        .collect();
    session_questions::bulk_insert(&mut *tx, &session_id, &rows).await?;

    audit::append(
        &mut *tx,
        audit::AuditEntry {
            session_id: &session_id,
            student_identifier: &student.student_identifier,
            status: AuditStatus::Connected,
            score: None,
            violation_reason: None,
            logged_at: now,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        session_id = %session_id,
        student = %student.student_identifier,
        questions = question_count,
        "exam session created"
    );

    Ok(LoginData {
        session_id,
        student_name,
        student_id: student.student_identifier,
        degree,
        course,
        question_count,
        expires_at: format_primitive(expires_at),
        duration_minutes: exam.session_duration_minutes,
        reading_time_seconds: exam.reading_time_seconds,
    })
}

/// Returns the session's fixed assignment. Re-validates state on every call:
/// a poll after expiry terminates the session through the violation path.
pub(crate) async fn fetch_questions(
    pool: &PgPool,
    session_id: &str,
) -> Result<Vec<QuestionData>, LifecycleError> {
    let session = sessions::find_by_id(pool, session_id)
        .await?
        .ok_or_else(|| LifecycleError::NotFound(SESSION_NOT_FOUND.to_string()))?;

    if session.status != SessionStatus::Active {
        return Err(LifecycleError::Validation(
            "Session Not Active. This exam session is no longer active. \
             Please contact support."
                .to_string(),
        ));
    }

    if session.expires_at <= primitive_now_utc() {
        report_violation(pool, session_id, EXPIRY_REASON).await?;
        return Err(LifecycleError::Validation(
            "Session Expired. Your exam session has expired. Please contact support.".to_string(),
        ));
    }

    let started_entry = audit::AuditEntry {
        session_id,
        student_identifier: &session.student_identifier,
        status: AuditStatus::StartedTest,
        score: None,
        violation_reason: None,
        logged_at: primitive_now_utc(),
    };
    if let Err(err) = audit::append(pool, started_entry).await {
        tracing::warn!(error = %err, session_id, "failed to record started_test audit entry");
    }

    let assigned = session_questions::list_for_session(pool, session_id).await?;

    Ok(assigned
        .into_iter()
        .map(|row| QuestionData {
            id: row.id,
            prompt: row.prompt,
            option_a: row.option_a,
            option_b: row.option_b,
            option_c: row.option_c,
            option_d: row.option_d,
            image_url: row.image_url,
            question_group_id: row.question_group_id,
            is_group_header: row.is_group_header,
            group_order: row.group_order,
            allows_multiple: row.allows_multiple,
            sequence: row.sequence,
        })
        .collect())
}

/// Scores and closes the session. Answers outside the session's assignment
/// (or aimed at group headers) are dropped, not rejected; duplicates keep
/// the last submission for the question.
pub(crate) async fn submit_exam(
    pool: &PgPool,
    session_id: &str,
    answers: Vec<AnswerSubmission>,
) -> Result<SubmitData, LifecycleError> {
    if answers.is_empty() {
        return Err(LifecycleError::Validation(
            "No Answers Provided. Please provide answers to submit the exam.".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let session = sessions::find_for_update(&mut *tx, session_id)
        .await?
        .ok_or_else(|| LifecycleError::NotFound(SESSION_NOT_FOUND.to_string()))?;

    if session.status != SessionStatus::Active {
        return Err(LifecycleError::Validation(
            "Session Already Closed. This exam session has already been closed. \
             Please contact support."
                .to_string(),
        ));
    }

    let now = primitive_now_utc();
    if session.expires_at <= now {
        terminate_locked(&mut tx, &session, EXPIRY_REASON, now).await?;
        tx.commit().await?;
        return Err(LifecycleError::Validation(
            "Session Time Elapsed. Your exam time has expired. The session has been closed."
                .to_string(),
        ));
    }

    let answerable: HashSet<i32> =
        session_questions::answerable_ids(&mut *tx, session_id).await?.into_iter().collect();

    let mut deduped: HashMap<i32, Vec<String>> = HashMap::new();
    for answer in answers {
        if !answerable.contains(&answer.question_id) {
            continue;
        }
        let letters = answer.selected_option.map(|s| s.into_letters()).unwrap_or_default();
        deduped.insert(answer.question_id, letters);
    }

    if deduped.is_empty() {
        return Err(LifecycleError::Validation(
            "No Valid Answers. No valid answers were submitted. Please provide answers to \
             the questions."
                .to_string(),
        ));
    }

    let ids: Vec<i32> = deduped.keys().copied().collect();
    let keys = questions::answer_keys(&mut *tx, &ids).await?;

    let mut score = 0.0;
    let mut rows = Vec::with_capacity(keys.len());
    for key in &keys {
        let letters = deduped.get(&key.id).cloned().unwrap_or_default();
        let scored = scoring::score_selection(&key.correct_option, key.allows_multiple, &letters);
        score += scored.earned;
        rows.push(responses::ResponseRow {
            question_id: key.id,
            selected_option: scored.selected_option,
            is_correct: scored.is_correct,
            partial_score: scored.partial_score,
        });
    }
    let score = scoring::round_two(score);

    // Replace, never accumulate: submission is idempotent by replacement.
    responses::delete_for_session(&mut *tx, session_id).await?;
    responses::bulk_insert(&mut *tx, session_id, &rows).await?;
    sessions::complete(&mut *tx, session_id, score, now).await?;

    audit::append(
        &mut *tx,
        audit::AuditEntry {
            session_id,
            student_identifier: &session.student_identifier,
            status: AuditStatus::Submitted,
            score: Some(score),
            violation_reason: None,
            logged_at: now,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(session_id, score, "exam submitted");

    Ok(SubmitData { total_questions: answerable.len() as i64 })
}

/// Appends a violation unconditionally; mutates the session only when it is
/// still active, so the first report wins and terminal states stay put.
pub(crate) async fn report_violation(
    pool: &PgPool,
    session_id: &str,
    reason: &str,
) -> Result<SessionStatus, LifecycleError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(LifecycleError::Validation(
            "Violation Reason Required. A violation reason must be provided.".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let session = sessions::find_for_update(&mut *tx, session_id)
        .await?
        .ok_or_else(|| LifecycleError::NotFound(SESSION_NOT_FOUND.to_string()))?;

    let now = primitive_now_utc();
    let mutated = terminate_locked(&mut tx, &session, reason, now).await?;

    tx.commit().await?;

    if mutated {
        tracing::warn!(session_id, reason, "session terminated for violation");
        Ok(SessionStatus::Terminated)
    } else {
        Ok(session.status)
    }
}

pub(crate) async fn session_status(
    pool: &PgPool,
    session_id: &str,
) -> Result<SessionStatusData, LifecycleError> {
    let session = sessions::find_by_id(pool, session_id)
        .await?
        .ok_or_else(|| LifecycleError::NotFound(SESSION_NOT_FOUND.to_string()))?;

    Ok(SessionStatusData {
        session_id: session.session_id,
        student_name: session.student_name,
        status: session.status,
        score: session.score,
        started_at: format_primitive(session.started_at),
        expires_at: format_primitive(session.expires_at),
        ended_at: session.ended_at.map(format_primitive),
        violation_reason: session.violation_reason,
    })
}

/// Shared termination path for explicit reports and expiry detected during
/// fetch/submit. The violation row is always written; the session row and
/// the audit entry are written only on the single ACTIVE -> TERMINATED
/// transition. Returns whether the session entity was mutated.
async fn terminate_locked(
    tx: &mut Transaction<'_, Postgres>,
    session: &ExamSession,
    reason: &str,
    now: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    violations::append(&mut **tx, &session.session_id, reason, now).await?;

    if session.status.is_terminal() {
        return Ok(false);
    }

    sessions::terminate(&mut **tx, &session.session_id, reason, now).await?;
    audit::append(
        &mut **tx,
        audit::AuditEntry {
            session_id: &session.session_id,
            student_identifier: &session.student_identifier,
            status: AuditStatus::KickedOut,
            score: session.score,
            violation_reason: Some(reason),
            logged_at: now,
        },
    )
    .await?;

    Ok(true)
}
