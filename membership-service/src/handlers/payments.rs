//! Payment handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::{PaymentResponse, RecordPaymentRequest, RecordPaymentResponse},
    middleware::AuthContext,
    services::PaymentIntake,
    AppState,
};

pub async fn record_payment(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<RecordPaymentResponse>), AppError> {
    tracing::info!(
        user_id = %auth.user_id,
        member_id = %payload.member_id,
        amount = %payload.amount,
        method = %payload.payment_method.as_str(),
        "Recording payment"
    );

    let (member, payment) = state
        .orchestrator
        .record_payment(PaymentIntake {
            member_id: payload.member_id,
            amount: payload.amount,
            payment_method: payload.payment_method,
            description: payload
                .description
                .unwrap_or_else(|| "Membership renewal".to_string()),
            transaction_id: payload.transaction_id,
            extension_days: payload.extension_days,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RecordPaymentResponse {
            member: member.into(),
            payment: payment.into(),
        }),
    ))
}

pub async fn member_payments(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    let payments = state.orchestrator.member_payments(member_id).await?;
    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}

pub async fn list_payments(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    let payments = state.orchestrator.list_payments().await?;
    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}
