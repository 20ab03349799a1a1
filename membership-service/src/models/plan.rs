//! Pricing catalog: per-plan prices, durations, and the admission-fee policy.
//!
//! Stored as a single versioned settings document rather than process-wide
//! mutable state; every computation loads it through the store.

use mongodb::bson::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::member::MembershipType;

/// The `_id` of the singleton catalog document.
pub const CATALOG_ID: &str = "pricing_catalog";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipPlan {
    pub key: MembershipType,
    pub name: String,
    pub duration_days: i64,
    /// Charged when a member newly joins this plan (includes setup).
    pub first_time_price: Decimal,
    /// Charged for continuing an existing plan past its first period.
    pub renewal_price: Decimal,
    /// Admission fee policy flag; true only for monthly in current policy.
    pub admission_fee_applicable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingCatalog {
    #[serde(rename = "_id")]
    pub id: String,
    pub gym_name: String,
    pub gym_address: String,
    pub gym_phone: String,
    pub gym_email: String,
    pub plans: Vec<MembershipPlan>,
    /// One-time fee, tracked separately from the plan prices.
    pub admission_fee_amount: Decimal,
    pub updated_by: String,
    pub updated_at: DateTime,
    /// Optimistic concurrency counter; bumped by the store on every write.
    pub version: i64,
}

impl PricingCatalog {
    /// Catalog seeded on first startup.
    pub fn default_catalog(now: DateTime) -> Self {
        Self {
            id: CATALOG_ID.to_string(),
            gym_name: "Iron Paradise Gym".to_string(),
            gym_address: String::new(),
            gym_phone: String::new(),
            gym_email: String::new(),
            plans: vec![
                MembershipPlan {
                    key: MembershipType::Monthly,
                    name: "Monthly Plan".to_string(),
                    duration_days: 30,
                    first_time_price: Decimal::from(2500),
                    renewal_price: Decimal::from(1000),
                    admission_fee_applicable: true,
                },
                MembershipPlan {
                    key: MembershipType::Quarterly,
                    name: "Quarterly Plan".to_string(),
                    duration_days: 90,
                    first_time_price: Decimal::from(3500),
                    renewal_price: Decimal::from(3000),
                    admission_fee_applicable: false,
                },
                MembershipPlan {
                    key: MembershipType::SixMonthly,
                    name: "Six Monthly Plan".to_string(),
                    duration_days: 180,
                    first_time_price: Decimal::from(6000),
                    renewal_price: Decimal::from(5500),
                    admission_fee_applicable: false,
                },
            ],
            admission_fee_amount: Decimal::from(2000),
            updated_by: "system".to_string(),
            updated_at: now,
            version: 0,
        }
    }

    pub fn plan(&self, key: MembershipType) -> Option<&MembershipPlan> {
        self.plans.iter().find(|p| p.key == key)
    }

    pub fn plan_mut(&mut self, key: MembershipType) -> Option<&mut MembershipPlan> {
        self.plans.iter_mut().find(|p| p.key == key)
    }
}

/// Partial update for a single plan. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanPatch {
    pub name: Option<String>,
    pub duration_days: Option<i64>,
    pub first_time_price: Option<Decimal>,
    pub renewal_price: Option<Decimal>,
    pub admission_fee_applicable: Option<bool>,
}

/// Partial update for the catalog-level settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    pub gym_name: Option<String>,
    pub gym_address: Option<String>,
    pub gym_phone: Option<String>,
    pub gym_email: Option<String>,
    pub admission_fee_amount: Option<Decimal>,
}
