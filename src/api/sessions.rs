use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use validator::Validate;

use crate::api::errors::{ApiError, ApiJson};
use crate::core::state::AppState;
use crate::schemas::session::{
    LoginData, LoginRequest, QuestionData, SessionStatusData, SubmitData, SubmitRequest,
    ViolationData, ViolationRequest,
};
use crate::schemas::ApiResponse;
use crate::services::lifecycle;

#[cfg(test)]
mod tests;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/:session_id/questions", get(questions))
        .route("/:session_id/submit", post(submit))
        .route("/:session_id/violation", post(violation))
        .route("/:session_id/status", get(status))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginData>>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let data = lifecycle::create_session(state.db(), state.settings().exam(), payload).await?;
    Ok(Json(ApiResponse::new(data)))
}

async fn questions(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<QuestionData>>>, ApiError> {
    let data = lifecycle::fetch_questions(state.db(), &session_id).await?;
    Ok(Json(ApiResponse::new(data)))
}

async fn submit(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    ApiJson(payload): ApiJson<SubmitRequest>,
) -> Result<Json<ApiResponse<SubmitData>>, ApiError> {
    let data = lifecycle::submit_exam(state.db(), &session_id, payload.answers).await?;
    Ok(Json(ApiResponse::new(data)))
}

async fn violation(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    ApiJson(payload): ApiJson<ViolationRequest>,
) -> Result<Json<ApiResponse<ViolationData>>, ApiError> {
    let status = lifecycle::report_violation(state.db(), &session_id, &payload.reason).await?;
    Ok(Json(ApiResponse::new(ViolationData { status })))
}

async fn status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<SessionStatusData>>, ApiError> {
    let data = lifecycle::session_status(state.db(), &session_id).await?;
    Ok(Json(ApiResponse::new(data)))
}
