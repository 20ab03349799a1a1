//! Payment ledger model. Records are append-only once written.

use mongodb::bson::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    Razorpay,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Razorpay => "razorpay",
        }
    }
}

/// Whether the ledger entry is money owed or money received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentRecordStatus {
    /// A charge raised against the member (enrollment, plan-change delta)
    /// that has not been paid yet.
    Outstanding,
    /// Money actually received.
    Settled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub member_id: Uuid,
    pub amount: Decimal,
    /// `None` for outstanding charges; set once money changes hands.
    pub payment_method: Option<PaymentMethod>,
    pub description: String,
    pub payment_date: DateTime,
    pub transaction_id: Option<String>,
    pub status: PaymentRecordStatus,
    /// How many days this payment extended the membership by, when it did.
    pub extension_days_applied: Option<i64>,
    /// The anchor the extension was measured from (the member's previous
    /// `membership_end`, never the payment date).
    pub anchor_date_used: Option<DateTime>,
}
