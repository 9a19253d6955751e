use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::types::SessionStatus;

#[derive(Debug, Clone, Deserialize, Validate)]
pub(crate) struct LoginRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) degree: String,
    #[serde(default)]
    pub(crate) course: String,
    #[serde(default)]
    #[serde(alias = "studentId")]
    pub(crate) student_id: String,
    #[serde(default)]
    #[serde(alias = "examPassword")]
    pub(crate) exam_password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginData {
    pub(crate) session_id: String,
    pub(crate) student_name: String,
    pub(crate) student_id: String,
    pub(crate) degree: String,
    pub(crate) course: String,
    pub(crate) question_count: usize,
    pub(crate) expires_at: String,
    pub(crate) duration_minutes: u64,
    pub(crate) reading_time_seconds: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionData {
    pub(crate) id: i32,
    pub(crate) prompt: String,
    pub(crate) option_a: String,
    pub(crate) option_b: String,
    pub(crate) option_c: String,
    pub(crate) option_d: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) question_group_id: Option<i32>,
    pub(crate) is_group_header: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) group_order: Option<i32>,
    pub(crate) allows_multiple: bool,
    pub(crate) sequence: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    #[serde(default)]
    pub(crate) answers: Vec<AnswerSubmission>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AnswerSubmission {
    #[serde(alias = "questionId")]
    pub(crate) question_id: i32,
    #[serde(default)]
    #[serde(alias = "selectedOption")]
    pub(crate) selected_option: Option<SelectedOption>,
}

/// The client sends one letter for single-select and a list for
/// multi-select; both shapes land here.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum SelectedOption {
    One(String),
    Many(Vec<String>),
}

impl SelectedOption {
    pub(crate) fn into_letters(self) -> Vec<String> {
        match self {
            Self::One(letter) => vec![letter],
            Self::Many(letters) => letters,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitData {
    pub(crate) total_questions: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ViolationRequest {
    #[serde(default)]
    pub(crate) reason: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ViolationData {
    pub(crate) status: SessionStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionStatusData {
    pub(crate) session_id: String,
    pub(crate) student_name: String,
    pub(crate) status: SessionStatus,
    pub(crate) score: Option<f64>,
    pub(crate) started_at: String,
    pub(crate) expires_at: String,
    pub(crate) ended_at: Option<String>,
    pub(crate) violation_reason: Option<String>,
}
