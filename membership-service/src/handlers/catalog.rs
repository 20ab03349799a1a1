//! Pricing catalog and gym settings handlers. Writes are admin-gated in the
//! orchestrator.

use axum::{
    extract::{Path, State},
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::{
        parse_plan_key, PlanResponse, PlanUpdateRequest, SettingsResponse, SettingsUpdateRequest,
    },
    middleware::AuthContext,
    models::{PlanPatch, SettingsPatch},
    AppState,
};

pub async fn get_plan(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(key): Path<String>,
) -> Result<Json<PlanResponse>, AppError> {
    let key = parse_plan_key(&key)?;
    let plan = state.orchestrator.plan(key).await?;
    Ok(Json(PlanResponse::from(plan)))
}

pub async fn update_plan(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(key): Path<String>,
    Json(payload): Json<PlanUpdateRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    let key = parse_plan_key(&key)?;

    tracing::info!(user_id = %auth.user_id, plan = %key, "Updating pricing plan");

    let plan = state
        .orchestrator
        .set_plan(
            key,
            PlanPatch {
                name: payload.name,
                duration_days: payload.duration_days,
                first_time_price: payload.first_time_price,
                renewal_price: payload.renewal_price,
                admission_fee_applicable: payload.admission_fee_applicable,
            },
            &auth,
        )
        .await?;

    Ok(Json(PlanResponse::from(plan)))
}

pub async fn get_settings(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<SettingsResponse>, AppError> {
    let catalog = state.orchestrator.catalog().await?;
    Ok(Json(SettingsResponse::from(catalog)))
}

pub async fn update_settings(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<SettingsUpdateRequest>,
) -> Result<Json<SettingsResponse>, AppError> {
    tracing::info!(user_id = %auth.user_id, "Updating gym settings");

    let catalog = state
        .orchestrator
        .update_settings(
            SettingsPatch {
                gym_name: payload.gym_name,
                gym_address: payload.gym_address,
                gym_phone: payload.gym_phone,
                gym_email: payload.gym_email,
                admission_fee_amount: payload.admission_fee_amount,
            },
            &auth,
        )
        .await?;

    Ok(Json(SettingsResponse::from(catalog)))
}
