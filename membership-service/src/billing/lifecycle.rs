//! Member status rules and payment-status derivation.
//!
//! `MemberStatus` is admin-controlled and only changes through explicit
//! action; `PaymentStatus` is never transitioned, it is recomputed from dates
//! and payments on every read.

use chrono::{DateTime, Utc};

use crate::models::{MemberStatus, PaymentStatus};

/// Urgency badge for an approaching expiry. Pure read-only projection,
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryUrgency {
    Expired,
    Critical,
    Urgent,
    Soon,
    Upcoming,
}

pub fn classify_urgency(days_until_expiry: i64) -> ExpiryUrgency {
    match days_until_expiry {
        d if d < 0 => ExpiryUrgency::Expired,
        d if d <= 1 => ExpiryUrgency::Critical,
        d if d <= 3 => ExpiryUrgency::Urgent,
        d if d <= 7 => ExpiryUrgency::Soon,
        _ => ExpiryUrgency::Upcoming,
    }
}

/// Whole days between `now` and `end`; negative once expired.
pub fn days_until_expiry(end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (end - now).num_days()
}

/// Full derivation from the ledger: expired when past the end date, paid when
/// a settled payment's coverage (anchor plus extension) reaches the current
/// end date, pending otherwise. A manually moved end date therefore reads as
/// pending until a payment covers the new period.
pub fn derive_payment_status(
    membership_end: DateTime<Utc>,
    settled_coverage_end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> PaymentStatus {
    if membership_end < now {
        return PaymentStatus::Expired;
    }
    match settled_coverage_end {
        Some(covered_through) if covered_through >= membership_end => PaymentStatus::Paid,
        _ => PaymentStatus::Pending,
    }
}

/// Cheap projection of a stored snapshot against "now", for list reads where
/// fetching the ledger per member would be wasteful.
pub fn payment_status_as_of(
    stored: PaymentStatus,
    membership_end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> PaymentStatus {
    if membership_end < now {
        PaymentStatus::Expired
    } else if stored == PaymentStatus::Expired {
        // End date moved forward since the snapshot (admin correction);
        // payment for the new period has not been seen.
        PaymentStatus::Pending
    } else {
        stored
    }
}

/// Destructive transitions are reserved for admins.
pub fn is_destructive(status: MemberStatus) -> bool {
    matches!(status, MemberStatus::Suspended | MemberStatus::Inactive)
}
