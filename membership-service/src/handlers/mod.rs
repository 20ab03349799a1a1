//! HTTP handlers for membership-service.

pub mod catalog;
pub mod dashboard;
pub mod members;
pub mod payments;

use axum::extract::State;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.orchestrator.health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "service": "membership-service" })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "service": "membership-service" })),
            )
        }
    }
}

pub async fn readiness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ready" })))
}

pub async fn metrics() -> impl IntoResponse {
    crate::services::get_metrics()
}
