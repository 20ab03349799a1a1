//! Renewal extension arithmetic.
//!
//! A payment extends the membership window from the member's previous
//! `membership_end`, never from "today". This holds for still-active members
//! (an early renewal must not shorten paid-for time) and for already expired
//! ones (the stored end date stays the anchor, carrying any unused tail).

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::models::{MembershipType, PricingCatalog};

use super::error::BillingError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewalExtension {
    pub anchor: DateTime<Utc>,
    pub extension_days: i64,
    pub new_membership_end: DateTime<Utc>,
    /// The plan whose renewal price matched the amount, when inference was
    /// used rather than an explicit override.
    pub matched_plan: Option<MembershipType>,
}

/// Determine how far a payment of `amount` extends a membership currently
/// ending at `current_end`.
///
/// When `explicit_days` is given it wins outright and the amount is recorded
/// as-is. Otherwise the amount must exactly match a plan's renewal price;
/// anything else is `UnknownAmount` and the caller has to clarify.
pub fn extend(
    catalog: &PricingCatalog,
    current_end: DateTime<Utc>,
    amount: Decimal,
    explicit_days: Option<i64>,
) -> Result<RenewalExtension, BillingError> {
    if amount <= Decimal::ZERO {
        return Err(BillingError::InvalidInput(format!(
            "payment amount must be positive, got {amount}"
        )));
    }
    if let Some(days) = explicit_days {
        if days <= 0 {
            return Err(BillingError::InvalidInput(format!(
                "extension_days must be positive, got {days}"
            )));
        }
    }

    let (extension_days, matched_plan) = match explicit_days {
        Some(days) => (days, None),
        None => {
            let plan = catalog
                .plans
                .iter()
                .find(|p| p.renewal_price == amount)
                .ok_or(BillingError::UnknownAmount(amount))?;
            (plan.duration_days, Some(plan.key))
        }
    };

    Ok(RenewalExtension {
        anchor: current_end,
        extension_days,
        new_membership_end: current_end + Duration::days(extension_days),
        matched_plan,
    })
}
