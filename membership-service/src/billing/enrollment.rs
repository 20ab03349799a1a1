//! Amount-due computation for enrollments, renewals, and plan changes.

use rust_decimal::Decimal;

use crate::models::{MembershipType, PricingCatalog};

use super::error::BillingError;

/// The amount due for a member transaction, broken into its line items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentQuote {
    pub enrollment_amount: Decimal,
    pub admission_fee_amount: Decimal,
    pub total_amount_due: Decimal,
}

/// Compute the amount due for `plan_key`.
///
/// `prior_plan` is `None` for a first-time enrollment (enrollment pricing)
/// and the member's current plan otherwise (subsequent pricing). The
/// admission fee is a separate line item applied only when the resolved plan
/// carries the admission-fee flag and the member is either new or switching
/// into that plan from a different one. Switching away removes it.
pub fn quote(
    catalog: &PricingCatalog,
    plan_key: MembershipType,
    prior_plan: Option<MembershipType>,
) -> Result<EnrollmentQuote, BillingError> {
    let plan = catalog
        .plan(plan_key)
        .ok_or_else(|| BillingError::InvalidPlan(plan_key.to_string()))?;

    let enrollment_amount = match prior_plan {
        None => plan.first_time_price,
        Some(_) => plan.renewal_price,
    };

    let switching_in = matches!(prior_plan, Some(prior) if prior != plan_key);
    let admission_applies = plan.admission_fee_applicable && (prior_plan.is_none() || switching_in);
    let admission_fee_amount = if admission_applies {
        catalog.admission_fee_amount
    } else {
        Decimal::ZERO
    };

    Ok(EnrollmentQuote {
        enrollment_amount,
        admission_fee_amount,
        total_amount_due: enrollment_amount + admission_fee_amount,
    })
}
