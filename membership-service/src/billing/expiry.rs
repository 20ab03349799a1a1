//! Expiry eligibility: the read-only projection feeding the reminder
//! subsystem and the "expiring soon" widgets.

use chrono::{DateTime, Duration, Utc};

use crate::models::Member;

use super::error::BillingError;
use super::lifecycle::{self, ExpiryUrgency};

/// Ephemeral projection of a member into the reminder feed. Never persisted.
#[derive(Debug, Clone)]
pub struct ReminderEligibility {
    pub member: Member,
    pub days_until_expiry: i64,
    pub urgency: ExpiryUrgency,
}

/// Upper bound of the expiry window. `days == 0` means "due today or already
/// overdue"; the window has no lower bound.
pub fn window_end(as_of: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>, BillingError> {
    if days < 0 {
        return Err(BillingError::InvalidInput(format!(
            "expiry window must be non-negative, got {days}"
        )));
    }
    Ok(as_of + Duration::days(days))
}

/// Project members (already filtered to the window by the store) into
/// reminder eligibility records, soonest expiry first.
pub fn evaluate(members: Vec<Member>, as_of: DateTime<Utc>) -> Vec<ReminderEligibility> {
    let mut records: Vec<ReminderEligibility> = members
        .into_iter()
        .map(|member| {
            let days = lifecycle::days_until_expiry(member.membership_end.to_chrono(), as_of);
            ReminderEligibility {
                days_until_expiry: days,
                urgency: lifecycle::classify_urgency(days),
                member,
            }
        })
        .collect();
    records.sort_by_key(|r| r.member.membership_end);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn negative_window_is_invalid() {
        let as_of = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        assert!(matches!(
            window_end(as_of, -1),
            Err(BillingError::InvalidInput(_))
        ));
    }

    #[test]
    fn window_end_is_inclusive_upper_bound() {
        let as_of = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        assert_eq!(window_end(as_of, 0).unwrap(), as_of);
        assert_eq!(
            window_end(as_of, 7).unwrap(),
            Utc.with_ymd_and_hms(2025, 6, 8, 9, 0, 0).unwrap()
        );
    }
}
