//! Request/response shapes for the HTTP surface.
//!
//! Plan keys and statuses arrive as strings and are parsed at the boundary so
//! the domain only ever sees typed values. Dates are RFC 3339 on the wire.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::billing::{BillingError, ExpiryUrgency, ReminderEligibility};
use crate::models::{
    EmergencyContact, Member, MembershipPlan, PaymentMethod, PaymentRecord, PaymentRecordStatus,
    PricingCatalog,
};

#[derive(Debug, Deserialize, Validate)]
pub struct EnrollMemberRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 32))]
    pub phone: String,
    #[validate(length(max = 500))]
    pub address: String,
    pub emergency_contact: EmergencyContactDto,
    pub membership_type: String,
    /// Defaults to "now" when omitted; accepts backdated enrollments.
    pub join_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EmergencyContactDto {
    pub name: String,
    pub phone: String,
}

impl From<EmergencyContactDto> for EmergencyContact {
    fn from(dto: EmergencyContactDto) -> Self {
        EmergencyContact {
            name: dto.name,
            phone: dto.phone,
        }
    }
}

impl From<EmergencyContact> for EmergencyContactDto {
    fn from(contact: EmergencyContact) -> Self {
        EmergencyContactDto {
            name: contact.name,
            phone: contact.phone,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMemberRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 32))]
    pub phone: String,
    #[validate(length(max = 500))]
    pub address: String,
    pub emergency_contact: EmergencyContactDto,
    pub membership_type: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub member_id: Uuid,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub description: Option<String>,
    pub transaction_id: Option<String>,
    /// Required when `amount` matches no plan's renewal price.
    pub extension_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePlanRequest {
    pub membership_type: String,
}

#[derive(Debug, Deserialize)]
pub struct DateOverrideRequest {
    pub date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct MemberListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExpiryQuery {
    /// Window in days; defaults to 7.
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PlanUpdateRequest {
    pub name: Option<String>,
    pub duration_days: Option<i64>,
    pub first_time_price: Option<Decimal>,
    pub renewal_price: Option<Decimal>,
    pub admission_fee_applicable: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SettingsUpdateRequest {
    pub gym_name: Option<String>,
    pub gym_address: Option<String>,
    pub gym_phone: Option<String>,
    pub gym_email: Option<String>,
    pub admission_fee_amount: Option<Decimal>,
}

/// Parse a plan key from the wire, mapping failures to the billing taxonomy.
pub fn parse_plan_key(s: &str) -> Result<crate::models::MembershipType, BillingError> {
    s.parse().map_err(BillingError::InvalidPlan)
}

/// Parse a member status from the wire.
pub fn parse_member_status(s: &str) -> Result<crate::models::MemberStatus, BillingError> {
    s.parse().map_err(BillingError::InvalidStatus)
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub emergency_contact: EmergencyContactDto,
    pub membership_type: String,
    pub join_date: DateTime<Utc>,
    pub membership_start: DateTime<Utc>,
    pub membership_end: DateTime<Utc>,
    pub member_status: String,
    pub current_payment_status: String,
    pub monthly_fee_amount: Decimal,
    pub admission_fee_amount: Decimal,
    pub total_amount_due: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        MemberResponse {
            id: member.id,
            name: member.name,
            email: member.email,
            phone: member.phone,
            address: member.address,
            emergency_contact: member.emergency_contact.into(),
            membership_type: member.membership_type.as_str().to_string(),
            join_date: member.join_date.to_chrono(),
            membership_start: member.membership_start.to_chrono(),
            membership_end: member.membership_end.to_chrono(),
            member_status: member.member_status.as_str().to_string(),
            current_payment_status: member.current_payment_status.as_str().to_string(),
            monthly_fee_amount: member.monthly_fee_amount,
            admission_fee_amount: member.admission_fee_amount,
            total_amount_due: member.total_amount_due,
            created_at: member.created_at.to_chrono(),
            updated_at: member.updated_at.to_chrono(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExpiringMemberResponse {
    #[serde(flatten)]
    pub member: MemberResponse,
    pub days_until_expiry: i64,
    pub urgency: ExpiryUrgency,
}

impl From<ReminderEligibility> for ExpiringMemberResponse {
    fn from(record: ReminderEligibility) -> Self {
        ExpiringMemberResponse {
            member: record.member.into(),
            days_until_expiry: record.days_until_expiry,
            urgency: record.urgency,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub member_id: Uuid,
    pub amount: Decimal,
    pub payment_method: Option<String>,
    pub description: String,
    pub payment_date: DateTime<Utc>,
    pub transaction_id: Option<String>,
    pub status: String,
    pub extension_days_applied: Option<i64>,
    pub anchor_date_used: Option<DateTime<Utc>>,
}

impl From<PaymentRecord> for PaymentResponse {
    fn from(payment: PaymentRecord) -> Self {
        PaymentResponse {
            id: payment.id,
            member_id: payment.member_id,
            amount: payment.amount,
            payment_method: payment.payment_method.map(|m| m.as_str().to_string()),
            description: payment.description,
            payment_date: payment.payment_date.to_chrono(),
            transaction_id: payment.transaction_id,
            status: match payment.status {
                PaymentRecordStatus::Outstanding => "outstanding".to_string(),
                PaymentRecordStatus::Settled => "settled".to_string(),
            },
            extension_days_applied: payment.extension_days_applied,
            anchor_date_used: payment.anchor_date_used.map(|d| d.to_chrono()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordPaymentResponse {
    pub member: MemberResponse,
    pub payment: PaymentResponse,
}

#[derive(Debug, Serialize)]
pub struct ChangePlanResponse {
    pub member: MemberResponse,
    /// Present when switching plans raised a new admission-fee charge.
    pub admission_charge: Option<PaymentResponse>,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub key: String,
    pub name: String,
    pub duration_days: i64,
    pub first_time_price: Decimal,
    pub renewal_price: Decimal,
    pub admission_fee_applicable: bool,
}

impl From<MembershipPlan> for PlanResponse {
    fn from(plan: MembershipPlan) -> Self {
        PlanResponse {
            key: plan.key.as_str().to_string(),
            name: plan.name,
            duration_days: plan.duration_days,
            first_time_price: plan.first_time_price,
            renewal_price: plan.renewal_price,
            admission_fee_applicable: plan.admission_fee_applicable,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub gym_name: String,
    pub gym_address: String,
    pub gym_phone: String,
    pub gym_email: String,
    pub admission_fee_amount: Decimal,
    pub plans: Vec<PlanResponse>,
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,
}

impl From<PricingCatalog> for SettingsResponse {
    fn from(catalog: PricingCatalog) -> Self {
        SettingsResponse {
            gym_name: catalog.gym_name,
            gym_address: catalog.gym_address,
            gym_phone: catalog.gym_phone,
            gym_email: catalog.gym_email,
            admission_fee_amount: catalog.admission_fee_amount,
            plans: catalog.plans.into_iter().map(PlanResponse::from).collect(),
            updated_by: catalog.updated_by,
            updated_at: catalog.updated_at.to_chrono(),
        }
    }
}
