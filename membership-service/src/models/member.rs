//! Member model and status enums.

use mongodb::bson::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Membership plan key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipType {
    Monthly,
    Quarterly,
    SixMonthly,
}

impl MembershipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipType::Monthly => "monthly",
            MembershipType::Quarterly => "quarterly",
            MembershipType::SixMonthly => "six_monthly",
        }
    }
}

impl fmt::Display for MembershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(MembershipType::Monthly),
            "quarterly" => Ok(MembershipType::Quarterly),
            "six_monthly" => Ok(MembershipType::SixMonthly),
            other => Err(other.to_string()),
        }
    }
}

/// Admin-controlled member status, orthogonal to payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Suspended,
    Frozen,
    Inactive,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Suspended => "suspended",
            MemberStatus::Frozen => "frozen",
            MemberStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MemberStatus::Active),
            "suspended" => Ok(MemberStatus::Suspended),
            "frozen" => Ok(MemberStatus::Frozen),
            "inactive" => Ok(MemberStatus::Inactive),
            other => Err(other.to_string()),
        }
    }
}

/// Payment status, derived from dates and payments. The stored value is a
/// snapshot taken at the last write; reads recompute it against "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Expired,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
}

/// Gym member.
///
/// Fee fields (`monthly_fee_amount`, `admission_fee_amount`,
/// `total_amount_due`) are snapshots taken from the pricing catalog at the
/// moment of calculation so historical invoices stay stable when the catalog
/// changes later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub emergency_contact: EmergencyContact,
    pub membership_type: MembershipType,
    pub join_date: DateTime,
    pub membership_start: DateTime,
    pub membership_end: DateTime,
    pub member_status: MemberStatus,
    pub current_payment_status: PaymentStatus,
    pub monthly_fee_amount: Decimal,
    pub admission_fee_amount: Decimal,
    pub total_amount_due: Decimal,
    /// Optimistic concurrency counter; bumped by the store on every write.
    pub version: i64,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}
