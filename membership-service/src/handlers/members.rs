//! Member lifecycle handlers: enrollment, edits, status, plan changes, and
//! the expiry feed.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{
        parse_member_status, parse_plan_key, ChangePlanRequest, ChangePlanResponse,
        DateOverrideRequest, EnrollMemberRequest, ExpiringMemberResponse, ExpiryQuery,
        MemberListQuery, MemberResponse, StatusUpdateRequest, UpdateMemberRequest,
    },
    middleware::AuthContext,
    services::{MemberDraft, MemberUpdate},
    AppState,
};

pub async fn enroll_member(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<EnrollMemberRequest>,
) -> Result<(StatusCode, Json<MemberResponse>), AppError> {
    payload.validate()?;
    let membership_type = parse_plan_key(&payload.membership_type)?;

    tracing::info!(
        user_id = %auth.user_id,
        plan = %membership_type,
        "Enrolling member"
    );

    let member = state
        .orchestrator
        .enroll(MemberDraft {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            address: payload.address,
            emergency_contact: payload.emergency_contact.into(),
            membership_type,
            join_date: payload.join_date,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(MemberResponse::from(member))))
}

pub async fn list_members(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(query): Query<MemberListQuery>,
) -> Result<Json<Vec<MemberResponse>>, AppError> {
    let status = query
        .status
        .as_deref()
        .map(parse_member_status)
        .transpose()?;

    let members = state.orchestrator.members(status).await?;
    Ok(Json(members.into_iter().map(MemberResponse::from).collect()))
}

pub async fn get_member(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(member_id): Path<Uuid>,
) -> Result<Json<MemberResponse>, AppError> {
    let member = state.orchestrator.member(member_id).await?;
    Ok(Json(MemberResponse::from(member)))
}

pub async fn update_member(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(member_id): Path<Uuid>,
    Json(payload): Json<UpdateMemberRequest>,
) -> Result<Json<MemberResponse>, AppError> {
    payload.validate()?;
    let membership_type = parse_plan_key(&payload.membership_type)?;

    tracing::info!(user_id = %auth.user_id, member_id = %member_id, "Updating member");

    let member = state
        .orchestrator
        .update_member(
            member_id,
            MemberUpdate {
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                address: payload.address,
                emergency_contact: payload.emergency_contact.into(),
                membership_type,
            },
        )
        .await?;

    Ok(Json(MemberResponse::from(member)))
}

pub async fn delete_member(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(member_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    tracing::info!(user_id = %auth.user_id, member_id = %member_id, "Deleting member");
    state.orchestrator.delete_member(member_id, &auth).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_member_status(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(member_id): Path<Uuid>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<MemberResponse>, AppError> {
    let status = parse_member_status(&payload.status)?;

    tracing::info!(
        user_id = %auth.user_id,
        member_id = %member_id,
        status = %status,
        "Updating member status"
    );

    let member = state
        .orchestrator
        .set_status(member_id, status, &auth)
        .await?;
    Ok(Json(MemberResponse::from(member)))
}

pub async fn change_plan(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(member_id): Path<Uuid>,
    Json(payload): Json<ChangePlanRequest>,
) -> Result<Json<ChangePlanResponse>, AppError> {
    let new_plan = parse_plan_key(&payload.membership_type)?;

    tracing::info!(
        user_id = %auth.user_id,
        member_id = %member_id,
        new_plan = %new_plan,
        "Changing membership plan"
    );

    let (member, charge) = state.orchestrator.change_plan(member_id, new_plan).await?;
    Ok(Json(ChangePlanResponse {
        member: member.into(),
        admission_charge: charge.map(Into::into),
    }))
}

pub async fn set_start_date(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(member_id): Path<Uuid>,
    Json(payload): Json<DateOverrideRequest>,
) -> Result<Json<MemberResponse>, AppError> {
    tracing::info!(
        user_id = %auth.user_id,
        member_id = %member_id,
        date = %payload.date,
        "Setting membership start date"
    );

    let member = state
        .orchestrator
        .set_start_date(member_id, payload.date, &auth)
        .await?;
    Ok(Json(MemberResponse::from(member)))
}

pub async fn set_end_date(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(member_id): Path<Uuid>,
    Json(payload): Json<DateOverrideRequest>,
) -> Result<Json<MemberResponse>, AppError> {
    tracing::info!(
        user_id = %auth.user_id,
        member_id = %member_id,
        date = %payload.date,
        "Setting membership end date"
    );

    let member = state
        .orchestrator
        .set_end_date(member_id, payload.date, &auth)
        .await?;
    Ok(Json(MemberResponse::from(member)))
}

pub async fn expiring_members(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(query): Query<ExpiryQuery>,
) -> Result<Json<Vec<ExpiringMemberResponse>>, AppError> {
    let days = query.days.unwrap_or(7);
    let records = state.orchestrator.expiring_within(days).await?;
    Ok(Json(
        records.into_iter().map(ExpiringMemberResponse::from).collect(),
    ))
}
