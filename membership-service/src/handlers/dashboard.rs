//! Dashboard stats handler.

use axum::{extract::State, Json};
use service_core::error::AppError;

use crate::{middleware::AuthContext, services::DashboardStats, AppState};

pub async fn dashboard_stats(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<DashboardStats>, AppError> {
    let stats = state.orchestrator.dashboard_stats().await?;
    Ok(Json(stats))
}
