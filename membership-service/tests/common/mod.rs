//! Test helper module for membership-service integration tests.
//!
//! Tests run against the in-memory store with a settable clock, so billing
//! and expiry behavior is deterministic and needs no running MongoDB.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

use membership_service::middleware::{AuthContext, Role};
use membership_service::models::{EmergencyContact, MembershipType};
use membership_service::services::{
    BillingOrchestrator, FixedClock, InMemoryMembershipStore, MemberDraft,
};

/// Fixed "now" all tests start from.
pub fn test_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
}

pub struct TestHarness {
    pub orchestrator: BillingOrchestrator,
    pub clock: Arc<FixedClock>,
    pub store: Arc<InMemoryMembershipStore>,
}

impl TestHarness {
    pub fn new() -> Self {
        let clock = Arc::new(FixedClock::new(test_epoch()));
        let store = Arc::new(InMemoryMembershipStore::new());
        let orchestrator = BillingOrchestrator::new(store.clone(), clock.clone());
        Self {
            orchestrator,
            clock,
            store,
        }
    }
}

pub fn admin() -> AuthContext {
    AuthContext::new("admin-1", Role::Admin)
}

pub fn staff() -> AuthContext {
    AuthContext::new("staff-1", Role::Staff)
}

/// A draft for the given plan with placeholder contact details.
pub fn draft(plan: MembershipType) -> MemberDraft {
    MemberDraft {
        name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        phone: "+91-9000000001".to_string(),
        address: "12 MG Road".to_string(),
        emergency_contact: EmergencyContact {
            name: "Ravi Rao".to_string(),
            phone: "+91-9000000002".to_string(),
        },
        membership_type: plan,
        join_date: None,
    }
}
