use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::core::metrics;
use crate::core::state::AppState;
use crate::repositories::sessions;
use crate::schemas::{HealthResponse, RootResponse};

pub(crate) async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Invigil Exam API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    // Active-session count doubles as the database probe; it is derived
    // from the store, never from in-process bookkeeping.
    match sessions::count_active(state.db()).await {
        Ok(active) => Json(HealthResponse {
            service: "invigil-api".to_string(),
            status: "healthy".to_string(),
            active_sessions: Some(active),
        }),
        Err(err) => {
            tracing::error!(error = %err, "health probe failed");
            Json(HealthResponse {
                service: "invigil-api".to_string(),
                status: "unhealthy".to_string(),
                active_sessions: None,
            })
        }
    }
}

pub(crate) async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    if !state.settings().telemetry().prometheus_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }

    match metrics::render() {
        Some(body) => ([(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
            .into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
