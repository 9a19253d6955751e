use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::SessionStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Student {
    pub(crate) student_identifier: String,
    pub(crate) full_name: String,
    pub(crate) degree: Option<String>,
    pub(crate) course: Option<String>,
    pub(crate) has_attempted: bool,
    pub(crate) is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: i32,
    pub(crate) prompt: String,
    pub(crate) option_a: String,
    pub(crate) option_b: String,
    pub(crate) option_c: String,
    pub(crate) option_d: String,
    pub(crate) correct_option: String,
    pub(crate) allows_multiple: bool,
    pub(crate) is_active: bool,
    pub(crate) image_url: Option<String>,
    pub(crate) question_group_id: Option<i32>,
    pub(crate) is_group_header: bool,
    pub(crate) group_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ExamSession {
    pub(crate) session_id: String,
    pub(crate) student_identifier: String,
    pub(crate) student_name: String,
    pub(crate) degree: String,
    pub(crate) course: String,
    pub(crate) status: SessionStatus,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) expires_at: PrimitiveDateTime,
    pub(crate) ended_at: Option<PrimitiveDateTime>,
    pub(crate) score: Option<f64>,
    pub(crate) violation_reason: Option<String>,
}

/// One row of a session's fixed question assignment, joined with the
/// question it points at. Option texts are returned to the client;
/// `correct_option` never leaves the repository layer on this path.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct AssignedQuestion {
    pub(crate) id: i32,
    pub(crate) prompt: String,
    pub(crate) option_a: String,
    pub(crate) option_b: String,
    pub(crate) option_c: String,
    pub(crate) option_d: String,
    pub(crate) image_url: Option<String>,
    pub(crate) question_group_id: Option<i32>,
    pub(crate) is_group_header: bool,
    pub(crate) group_order: Option<i32>,
    pub(crate) allows_multiple: bool,
    pub(crate) sequence: Option<i32>,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct AnswerKey {
    pub(crate) id: i32,
    pub(crate) correct_option: String,
    pub(crate) allows_multiple: bool,
}

#[cfg(test)]
#[derive(Debug, Clone, FromRow)]
pub(crate) struct Response {
    pub(crate) question_id: i32,
    pub(crate) selected_option: Option<String>,
    pub(crate) is_correct: bool,
    pub(crate) partial_score: Option<f64>,
}

#[cfg(test)]
#[derive(Debug, Clone, FromRow)]
pub(crate) struct Violation {
    pub(crate) id: i64,
    pub(crate) session_id: String,
    pub(crate) reason: String,
    pub(crate) recorded_at: PrimitiveDateTime,
}
