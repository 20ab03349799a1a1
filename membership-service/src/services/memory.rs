//! In-memory membership store.
//!
//! Backs deterministic tests and store-free local runs with the same
//! versioning and atomicity semantics as the MongoDB implementation: a
//! single lock guards each mutation, so paired writes land together.

use async_trait::async_trait;
use mongodb::bson::DateTime;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::billing::BillingError;
use crate::models::{Member, MemberStatus, PaymentRecord, PricingCatalog};

use super::store::MembershipStore;

#[derive(Default)]
struct Inner {
    catalog: Option<PricingCatalog>,
    members: HashMap<Uuid, Member>,
    payments: Vec<PaymentRecord>,
}

#[derive(Default)]
pub struct InMemoryMembershipStore {
    inner: RwLock<Inner>,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MembershipStore for InMemoryMembershipStore {
    async fn load_catalog(&self) -> Result<PricingCatalog, BillingError> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .catalog
            .get_or_insert_with(|| PricingCatalog::default_catalog(DateTime::now()))
            .clone())
    }

    async fn save_catalog(
        &self,
        catalog: PricingCatalog,
        expected_version: i64,
    ) -> Result<PricingCatalog, BillingError> {
        let mut inner = self.inner.write().await;
        let current_version = inner.catalog.as_ref().map(|c| c.version).unwrap_or(0);
        if current_version != expected_version {
            return Err(BillingError::ConcurrentModification(
                "pricing catalog".to_string(),
            ));
        }
        let mut updated = catalog;
        updated.version = expected_version + 1;
        inner.catalog = Some(updated.clone());
        Ok(updated)
    }

    async fn insert_member_with_charge(
        &self,
        member: Member,
        charge: PaymentRecord,
    ) -> Result<(), BillingError> {
        let mut inner = self.inner.write().await;
        inner.members.insert(member.id, member);
        inner.payments.push(charge);
        Ok(())
    }

    async fn get_member(&self, id: Uuid) -> Result<Option<Member>, BillingError> {
        Ok(self.inner.read().await.members.get(&id).cloned())
    }

    async fn list_members(
        &self,
        status: Option<MemberStatus>,
    ) -> Result<Vec<Member>, BillingError> {
        let inner = self.inner.read().await;
        Ok(inner
            .members
            .values()
            .filter(|m| status.map_or(true, |s| m.member_status == s))
            .cloned()
            .collect())
    }

    async fn update_member(
        &self,
        member: Member,
        expected_version: i64,
    ) -> Result<Member, BillingError> {
        let mut inner = self.inner.write().await;
        let existing = inner
            .members
            .get(&member.id)
            .ok_or_else(|| BillingError::NotFound(format!("member {}", member.id)))?;
        if existing.version != expected_version {
            return Err(BillingError::ConcurrentModification(format!(
                "member {}",
                member.id
            )));
        }
        let mut updated = member;
        updated.version = expected_version + 1;
        inner.members.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn commit_payment(
        &self,
        member: Member,
        expected_version: i64,
        payment: PaymentRecord,
    ) -> Result<(Member, PaymentRecord), BillingError> {
        let mut inner = self.inner.write().await;
        let existing = inner
            .members
            .get(&member.id)
            .ok_or_else(|| BillingError::NotFound(format!("member {}", member.id)))?;
        if existing.version != expected_version {
            return Err(BillingError::ConcurrentModification(format!(
                "member {}",
                member.id
            )));
        }
        let mut updated = member;
        updated.version = expected_version + 1;
        inner.members.insert(updated.id, updated.clone());
        inner.payments.push(payment.clone());
        Ok((updated, payment))
    }

    async fn delete_member(&self, id: Uuid) -> Result<(), BillingError> {
        let mut inner = self.inner.write().await;
        inner.members.remove(&id);
        inner.payments.retain(|p| p.member_id != id);
        Ok(())
    }

    async fn payments_for_member(
        &self,
        member_id: Uuid,
    ) -> Result<Vec<PaymentRecord>, BillingError> {
        let inner = self.inner.read().await;
        let mut payments: Vec<PaymentRecord> = inner
            .payments
            .iter()
            .filter(|p| p.member_id == member_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
        Ok(payments)
    }

    async fn list_payments(&self) -> Result<Vec<PaymentRecord>, BillingError> {
        let inner = self.inner.read().await;
        let mut payments = inner.payments.clone();
        payments.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
        Ok(payments)
    }

    async fn members_expiring_by(&self, cutoff: DateTime) -> Result<Vec<Member>, BillingError> {
        let inner = self.inner.read().await;
        Ok(inner
            .members
            .values()
            .filter(|m| m.membership_end <= cutoff)
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<(), BillingError> {
        Ok(())
    }
}
