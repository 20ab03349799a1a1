//! Persistence port for members, payments, and the pricing catalog.
//!
//! Writes that read-then-modify a member carry the version observed at read
//! time; implementations must reject stale versions with
//! `ConcurrentModification` so two concurrent payments against the same
//! member cannot lose an update. Paired writes (member + payment record)
//! must be atomic: both land or neither does.

use async_trait::async_trait;
use mongodb::bson::DateTime;
use uuid::Uuid;

use crate::billing::BillingError;
use crate::models::{Member, MemberStatus, PaymentRecord, PricingCatalog};

#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Load the catalog, seeding the default document on first use.
    async fn load_catalog(&self) -> Result<PricingCatalog, BillingError>;

    /// Replace the catalog; `expected_version` is the version read before
    /// the mutation. The stored version is bumped on success.
    async fn save_catalog(
        &self,
        catalog: PricingCatalog,
        expected_version: i64,
    ) -> Result<PricingCatalog, BillingError>;

    /// Atomically create a member together with its enrollment charge.
    async fn insert_member_with_charge(
        &self,
        member: Member,
        charge: PaymentRecord,
    ) -> Result<(), BillingError>;

    async fn get_member(&self, id: Uuid) -> Result<Option<Member>, BillingError>;

    async fn list_members(
        &self,
        status: Option<MemberStatus>,
    ) -> Result<Vec<Member>, BillingError>;

    /// Replace a member document, enforcing the version check and bumping
    /// the stored version.
    async fn update_member(
        &self,
        member: Member,
        expected_version: i64,
    ) -> Result<Member, BillingError>;

    /// Atomically replace a member (version-checked) and append a payment
    /// record.
    async fn commit_payment(
        &self,
        member: Member,
        expected_version: i64,
        payment: PaymentRecord,
    ) -> Result<(Member, PaymentRecord), BillingError>;

    /// Hard delete, cascading the member's payment records.
    async fn delete_member(&self, id: Uuid) -> Result<(), BillingError>;

    async fn payments_for_member(
        &self,
        member_id: Uuid,
    ) -> Result<Vec<PaymentRecord>, BillingError>;

    /// All payments, most recent first.
    async fn list_payments(&self) -> Result<Vec<PaymentRecord>, BillingError>;

    /// Members whose `membership_end` is at or before `cutoff` (due or
    /// overdue).
    async fn members_expiring_by(&self, cutoff: DateTime) -> Result<Vec<Member>, BillingError>;

    async fn health_check(&self) -> Result<(), BillingError>;
}
