//! HTTP client half of the exam client: wraps the session endpoints and
//! folds the server's response envelope into `Result`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure; the caller may retry.
    #[error("request failed: {0}")]
    Connectivity(#[from] reqwest::Error),
    /// The server answered with the failure envelope.
    #[error("{message}")]
    Domain { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    pub name: String,
    pub degree: String,
    pub course: String,
    pub student_id: String,
    pub exam_password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub session_id: String,
    pub student_name: String,
    pub student_id: String,
    pub degree: String,
    pub course: String,
    pub question_count: usize,
    pub expires_at: String,
    pub duration_minutes: u64,
    pub reading_time_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedQuestion {
    pub id: i32,
    pub prompt: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub question_group_id: Option<i32>,
    pub is_group_header: bool,
    #[serde(default)]
    pub group_order: Option<i32>,
    pub allows_multiple: bool,
    pub sequence: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerPayload {
    pub question_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<serde_json::Value>,
}

impl AnswerPayload {
    pub fn single(question_id: i32, letter: &str) -> Self {
        Self { question_id, selected_option: Some(serde_json::Value::String(letter.to_string())) }
    }

    pub fn multiple(question_id: i32, letters: &[&str]) -> Self {
        let list = letters.iter().map(|l| serde_json::Value::String(l.to_string())).collect();
        Self { question_id, selected_option: Some(serde_json::Value::Array(list)) }
    }

    pub fn unanswered(question_id: i32) -> Self {
        Self { question_id, selected_option: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub total_questions: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViolationOutcome {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub student_name: String,
    pub status: String,
    pub score: Option<f64>,
    pub started_at: String,
    pub expires_at: String,
    pub ended_at: Option<String>,
    pub violation_reason: Option<String>,
}

/// Typed access to the `/api/session` surface.
#[derive(Debug, Clone)]
pub struct SessionClient {
    http: reqwest::Client,
    base_url: String,
}

impl SessionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into() }
    }

    pub async fn login(&self, form: &LoginForm) -> Result<LoginOutcome, ClientError> {
        let url = format!("{}/api/session/login", self.base_url);
        let response = self.http.post(url).json(form).send().await?;
        unwrap_envelope(response).await
    }

    pub async fn fetch_questions(
        &self,
        session_id: &str,
    ) -> Result<Vec<AssignedQuestion>, ClientError> {
        let url = format!("{}/api/session/{session_id}/questions", self.base_url);
        let response = self.http.get(url).send().await?;
        unwrap_envelope(response).await
    }

    pub async fn submit(
        &self,
        session_id: &str,
        answers: &[AnswerPayload],
    ) -> Result<SubmitOutcome, ClientError> {
        let url = format!("{}/api/session/{session_id}/submit", self.base_url);
        let body = serde_json::json!({ "answers": answers });
        let response = self.http.post(url).json(&body).send().await?;
        unwrap_envelope(response).await
    }

    pub async fn report_violation(
        &self,
        session_id: &str,
        reason: &str,
    ) -> Result<ViolationOutcome, ClientError> {
        let url = format!("{}/api/session/{session_id}/violation", self.base_url);
        let body = serde_json::json!({ "reason": reason });
        let response = self.http.post(url).json(&body).send().await?;
        unwrap_envelope(response).await
    }

    pub async fn session_status(&self, session_id: &str) -> Result<SessionSummary, ClientError> {
        let url = format!("{}/api/session/{session_id}/status", self.base_url);
        let response = self.http.get(url).send().await?;
        unwrap_envelope(response).await
    }

    /// Local countdown hit zero: try to submit whatever the candidate has,
    /// and if the server refuses (its clock is authoritative and the session
    /// may already be closed), fall back to reporting the expiry violation.
    /// Either way the session ends closed on the server.
    pub async fn finish_on_expiry(
        &self,
        session_id: &str,
        answers: &[AnswerPayload],
    ) -> Result<(), ClientError> {
        match self.submit(session_id, answers).await {
            Ok(_) => Ok(()),
            Err(ClientError::Domain { .. }) => {
                match self.report_violation(session_id, "Exam time elapsed").await {
                    Ok(_) => Ok(()),
                    // A violation refused with a domain error means the
                    // session is already terminal; treat it as settled.
                    Err(ClientError::Domain { .. }) => Ok(()),
                    Err(err) => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }
}

async fn unwrap_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status().as_u16();
    let envelope: Envelope<T> = response.json().await?;

    match envelope {
        Envelope { success: true, data: Some(data), .. } => Ok(data),
        Envelope { message, .. } => Err(ClientError::Domain {
            status,
            message: message.unwrap_or_else(|| "malformed server response".to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_payload_serializes_both_shapes() {
        let single = serde_json::to_value(AnswerPayload::single(4, "B")).expect("single");
        assert_eq!(single, serde_json::json!({"questionId": 4, "selectedOption": "B"}));

        let multi = serde_json::to_value(AnswerPayload::multiple(9, &["A", "C"])).expect("multi");
        assert_eq!(multi, serde_json::json!({"questionId": 9, "selectedOption": ["A", "C"]}));

        let blank = serde_json::to_value(AnswerPayload::unanswered(2)).expect("blank");
        assert_eq!(blank, serde_json::json!({"questionId": 2}));
    }

    #[test]
    fn envelope_splits_success_and_failure() {
        let ok: Envelope<SubmitOutcome> =
            serde_json::from_value(serde_json::json!({"success": true, "data": {"totalQuestions": 30}}))
                .expect("success envelope");
        assert!(ok.success);
        assert_eq!(ok.data.expect("data").total_questions, 30);

        let err: Envelope<SubmitOutcome> = serde_json::from_value(
            serde_json::json!({"success": false, "message": "Session Expired."}),
        )
        .expect("failure envelope");
        assert!(!err.success);
        assert!(err.data.is_none());
        assert_eq!(err.message.as_deref(), Some("Session Expired."));
    }

    #[test]
    fn login_outcome_parses_wire_fields() {
        let outcome: LoginOutcome = serde_json::from_value(serde_json::json!({
            "sessionId": "abc",
            "studentName": "Ada Lovelace",
            "studentId": "COLL-001",
            "degree": "B.Sc",
            "course": "Mathematics",
            "questionCount": 30,
            "expiresAt": "2026-03-09T09:00:00Z",
            "durationMinutes": 45,
            "readingTimeSeconds": 120
        }))
        .expect("login outcome");
        assert_eq!(outcome.question_count, 30);
        assert_eq!(outcome.reading_time_seconds, 120);
    }
}
