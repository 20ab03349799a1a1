//! Billing orchestrator: the façade the API layer talks to.
//!
//! Every write path pairs the member mutation with its payment record in one
//! atomic store call and retries exactly once when the per-member version
//! check fails.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use mongodb::bson::DateTime as BsonDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::billing::{enrollment, expiry, lifecycle, renewal};
use crate::billing::{BillingError, ReminderEligibility};
use crate::middleware::AuthContext;
use crate::models::{
    EmergencyContact, Member, MemberStatus, MembershipPlan, MembershipType, PaymentMethod,
    PaymentRecord, PaymentRecordStatus, PaymentStatus, PlanPatch, PricingCatalog, SettingsPatch,
};

use super::clock::Clock;
use super::metrics;
use super::store::MembershipStore;

#[derive(Debug, Clone)]
pub struct MemberDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub emergency_contact: EmergencyContact,
    pub membership_type: MembershipType,
    pub join_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct MemberUpdate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub emergency_contact: EmergencyContact,
    pub membership_type: MembershipType,
}

#[derive(Debug, Clone)]
pub struct PaymentIntake {
    pub member_id: Uuid,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub description: String,
    pub transaction_id: Option<String>,
    /// Explicit override when the amount matches no renewal rule.
    pub extension_days: Option<i64>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DashboardStats {
    pub total_members: u64,
    pub active_members: u64,
    pub pending_members: u64,
    pub expired_members: u64,
    pub expiring_soon: u64,
    pub monthly_revenue: Decimal,
}

pub struct BillingOrchestrator {
    store: Arc<dyn MembershipStore>,
    clock: Arc<dyn Clock>,
}

impl BillingOrchestrator {
    pub fn new(store: Arc<dyn MembershipStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn bson_now(&self) -> BsonDateTime {
        BsonDateTime::from_chrono(self.clock.now())
    }

    async fn load_member(&self, id: Uuid) -> Result<Member, BillingError> {
        self.store
            .get_member(id)
            .await?
            .ok_or_else(|| BillingError::NotFound(format!("member {id}")))
    }

    /// Read-modify-write a member with one automatic retry on a stale
    /// version.
    async fn update_with_retry<F>(&self, id: Uuid, mutate: F) -> Result<Member, BillingError>
    where
        F: Fn(&mut Member) -> Result<(), BillingError>,
    {
        let mut attempt = 0;
        loop {
            let member = self.load_member(id).await?;
            let expected_version = member.version;
            let mut updated = member;
            mutate(&mut updated)?;
            updated.updated_at = self.bson_now();

            match self.store.update_member(updated, expected_version).await {
                Err(BillingError::ConcurrentModification(what)) if attempt == 0 => {
                    tracing::warn!(member_id = %id, %what, "Version conflict, retrying");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    pub async fn health(&self) -> Result<(), BillingError> {
        self.store.health_check().await
    }

    // --- Enrollment -------------------------------------------------------

    /// Create a member with snapshotted fee fields and the enrollment charge
    /// as an outstanding ledger entry. A fresh enrollment always starts
    /// `active` with payment `pending`.
    pub async fn enroll(&self, draft: MemberDraft) -> Result<Member, BillingError> {
        let catalog = self.store.load_catalog().await?;
        let quote = enrollment::quote(&catalog, draft.membership_type, None)?;
        let plan = catalog
            .plan(draft.membership_type)
            .ok_or_else(|| BillingError::InvalidPlan(draft.membership_type.to_string()))?;

        let now = self.clock.now();
        let join = draft.join_date.unwrap_or(now);
        let membership_end = join + chrono::Duration::days(plan.duration_days);

        let member = Member {
            id: Uuid::new_v4(),
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            address: draft.address,
            emergency_contact: draft.emergency_contact,
            membership_type: draft.membership_type,
            join_date: BsonDateTime::from_chrono(join),
            membership_start: BsonDateTime::from_chrono(join),
            membership_end: BsonDateTime::from_chrono(membership_end),
            member_status: MemberStatus::Active,
            current_payment_status: PaymentStatus::Pending,
            monthly_fee_amount: quote.enrollment_amount,
            admission_fee_amount: quote.admission_fee_amount,
            total_amount_due: quote.total_amount_due,
            version: 0,
            created_at: BsonDateTime::from_chrono(now),
            updated_at: BsonDateTime::from_chrono(now),
        };

        let charge = PaymentRecord {
            id: Uuid::new_v4(),
            member_id: member.id,
            amount: quote.total_amount_due,
            payment_method: None,
            description: format!("Enrollment charge ({} plan)", plan.name),
            payment_date: BsonDateTime::from_chrono(now),
            transaction_id: None,
            status: PaymentRecordStatus::Outstanding,
            extension_days_applied: None,
            anchor_date_used: None,
        };

        self.store
            .insert_member_with_charge(member.clone(), charge)
            .await?;

        metrics::record_enrollment(member.membership_type.as_str());
        tracing::info!(
            member_id = %member.id,
            plan = %member.membership_type,
            total_due = %member.total_amount_due,
            "Enrolled member"
        );

        Ok(member)
    }

    // --- Reads ------------------------------------------------------------

    /// Furthest coverage any settled payment bought (anchor + extension).
    async fn settled_coverage_end(
        &self,
        member_id: Uuid,
    ) -> Result<Option<DateTime<Utc>>, BillingError> {
        let payments = self.store.payments_for_member(member_id).await?;
        Ok(payments
            .iter()
            .filter(|p| p.status == PaymentRecordStatus::Settled)
            .filter_map(|p| {
                let anchor = p.anchor_date_used?.to_chrono();
                let days = p.extension_days_applied?;
                Some(anchor + chrono::Duration::days(days))
            })
            .max())
    }

    /// Fetch one member with the payment status fully derived from the
    /// ledger.
    pub async fn member(&self, id: Uuid) -> Result<Member, BillingError> {
        let mut member = self.load_member(id).await?;
        let covered_through = self.settled_coverage_end(id).await?;

        member.current_payment_status = lifecycle::derive_payment_status(
            member.membership_end.to_chrono(),
            covered_through,
            self.clock.now(),
        );
        Ok(member)
    }

    /// List members, projecting the stored payment-status snapshot against
    /// "now".
    pub async fn members(
        &self,
        status: Option<MemberStatus>,
    ) -> Result<Vec<Member>, BillingError> {
        let now = self.clock.now();
        let mut members = self.store.list_members(status).await?;
        for member in &mut members {
            member.current_payment_status = lifecycle::payment_status_as_of(
                member.current_payment_status,
                member.membership_end.to_chrono(),
                now,
            );
        }
        members.sort_by_key(|m| m.created_at);
        Ok(members)
    }

    // --- Payments ---------------------------------------------------------

    /// Record a payment: the extension is measured from the member's
    /// previous `membership_end`, never from the payment date.
    pub async fn record_payment(
        &self,
        intake: PaymentIntake,
    ) -> Result<(Member, PaymentRecord), BillingError> {
        match self.try_record_payment(&intake).await {
            Err(BillingError::ConcurrentModification(what)) => {
                tracing::warn!(member_id = %intake.member_id, %what, "Version conflict, retrying");
                self.try_record_payment(&intake).await
            }
            other => other,
        }
    }

    async fn try_record_payment(
        &self,
        intake: &PaymentIntake,
    ) -> Result<(Member, PaymentRecord), BillingError> {
        let member = self.load_member(intake.member_id).await?;
        let catalog = self.store.load_catalog().await?;
        let now = self.clock.now();

        let extension = renewal::extend(
            &catalog,
            member.membership_end.to_chrono(),
            intake.amount,
            intake.extension_days,
        )?;

        let payment = PaymentRecord {
            id: Uuid::new_v4(),
            member_id: member.id,
            amount: intake.amount,
            payment_method: Some(intake.payment_method),
            description: intake.description.clone(),
            payment_date: BsonDateTime::from_chrono(now),
            transaction_id: intake.transaction_id.clone(),
            status: PaymentRecordStatus::Settled,
            extension_days_applied: Some(extension.extension_days),
            anchor_date_used: Some(BsonDateTime::from_chrono(extension.anchor)),
        };

        let expected_version = member.version;
        let mut updated = member;
        updated.membership_end = BsonDateTime::from_chrono(extension.new_membership_end);
        updated.current_payment_status = PaymentStatus::Paid;
        if updated.member_status == MemberStatus::Inactive {
            updated.member_status = MemberStatus::Active;
        }
        updated.updated_at = BsonDateTime::from_chrono(now);

        let (updated, payment) = self
            .store
            .commit_payment(updated, expected_version, payment)
            .await?;

        metrics::record_payment(
            intake.payment_method.as_str(),
            intake.amount.to_u64().unwrap_or(0),
        );
        tracing::info!(
            member_id = %updated.id,
            payment_id = %payment.id,
            amount = %payment.amount,
            extension_days = extension.extension_days,
            new_end = %updated.membership_end,
            "Recorded payment"
        );

        Ok((updated, payment))
    }

    pub async fn member_payments(
        &self,
        member_id: Uuid,
    ) -> Result<Vec<PaymentRecord>, BillingError> {
        self.load_member(member_id).await?;
        self.store.payments_for_member(member_id).await
    }

    pub async fn list_payments(&self) -> Result<Vec<PaymentRecord>, BillingError> {
        self.store.list_payments().await
    }

    // --- Plan changes and corrections -------------------------------------

    /// Switch a member's plan. Admission fee applicability is re-resolved:
    /// switching into monthly re-applies it (as an outstanding delta charge),
    /// switching away removes it. Dates are untouched; only payments move
    /// `membership_end`.
    pub async fn change_plan(
        &self,
        member_id: Uuid,
        new_plan: MembershipType,
    ) -> Result<(Member, Option<PaymentRecord>), BillingError> {
        match self.try_change_plan(member_id, new_plan).await {
            Err(BillingError::ConcurrentModification(what)) => {
                tracing::warn!(member_id = %member_id, %what, "Version conflict, retrying");
                self.try_change_plan(member_id, new_plan).await
            }
            other => other,
        }
    }

    async fn try_change_plan(
        &self,
        member_id: Uuid,
        new_plan: MembershipType,
    ) -> Result<(Member, Option<PaymentRecord>), BillingError> {
        let member = self.load_member(member_id).await?;
        if member.membership_type == new_plan {
            return Ok((member, None));
        }

        let catalog = self.store.load_catalog().await?;
        let quote = enrollment::quote(&catalog, new_plan, Some(member.membership_type))?;
        let now = self.clock.now();

        let expected_version = member.version;
        let prior_plan = member.membership_type;
        let mut updated = member;
        updated.membership_type = new_plan;
        updated.monthly_fee_amount = quote.enrollment_amount;
        updated.admission_fee_amount = quote.admission_fee_amount;
        updated.total_amount_due = quote.total_amount_due;
        updated.updated_at = BsonDateTime::from_chrono(now);

        let delta = if quote.admission_fee_amount > Decimal::ZERO {
            Some(PaymentRecord {
                id: Uuid::new_v4(),
                member_id: updated.id,
                amount: quote.admission_fee_amount,
                payment_method: None,
                description: format!("Admission fee on switch from {prior_plan} to {new_plan}"),
                payment_date: BsonDateTime::from_chrono(now),
                transaction_id: None,
                status: PaymentRecordStatus::Outstanding,
                extension_days_applied: None,
                anchor_date_used: None,
            })
        } else {
            None
        };

        let result = match delta {
            Some(charge) => {
                let (member, charge) = self
                    .store
                    .commit_payment(updated, expected_version, charge)
                    .await?;
                (member, Some(charge))
            }
            None => {
                let member = self.store.update_member(updated, expected_version).await?;
                (member, None)
            }
        };

        tracing::info!(
            member_id = %result.0.id,
            from = %prior_plan,
            to = %new_plan,
            admission_fee = %quote.admission_fee_amount,
            "Changed membership plan"
        );
        Ok(result)
    }

    /// Full contact/plan edit. A plan change here recomputes the snapshot
    /// fees at subsequent pricing; use `change_plan` to also raise the
    /// admission-fee delta charge.
    pub async fn update_member(
        &self,
        member_id: Uuid,
        update: MemberUpdate,
    ) -> Result<Member, BillingError> {
        let catalog = self.store.load_catalog().await?;
        let updated = self
            .update_with_retry(member_id, |member| {
                if member.membership_type != update.membership_type {
                    let quote = enrollment::quote(
                        &catalog,
                        update.membership_type,
                        Some(member.membership_type),
                    )?;
                    member.membership_type = update.membership_type;
                    member.monthly_fee_amount = quote.enrollment_amount;
                    member.admission_fee_amount = quote.admission_fee_amount;
                    member.total_amount_due = quote.total_amount_due;
                }
                member.name = update.name.clone();
                member.email = update.email.clone();
                member.phone = update.phone.clone();
                member.address = update.address.clone();
                member.emergency_contact = update.emergency_contact.clone();
                Ok(())
            })
            .await?;

        tracing::info!(member_id = %updated.id, "Updated member");
        Ok(updated)
    }

    /// Backdate/correct the start of the membership: a full recompute,
    /// `membership_end = new_start + plan duration`. Explicitly distinct
    /// from the incremental-from-previous-end payment path.
    pub async fn set_start_date(
        &self,
        member_id: Uuid,
        new_start: DateTime<Utc>,
        actor: &AuthContext,
    ) -> Result<Member, BillingError> {
        self.require_admin(actor, "set start date")?;
        let catalog = self.store.load_catalog().await?;
        let covered_through = self.settled_coverage_end(member_id).await?;
        let now = self.clock.now();

        let updated = self
            .update_with_retry(member_id, |member| {
                let plan = catalog
                    .plan(member.membership_type)
                    .ok_or_else(|| BillingError::InvalidPlan(member.membership_type.to_string()))?;
                let new_end = new_start + chrono::Duration::days(plan.duration_days);
                member.membership_start = BsonDateTime::from_chrono(new_start);
                member.join_date = BsonDateTime::from_chrono(new_start);
                member.membership_end = BsonDateTime::from_chrono(new_end);
                // Keep the stored snapshot honest about the recomputed window.
                member.current_payment_status =
                    lifecycle::derive_payment_status(new_end, covered_through, now);
                Ok(())
            })
            .await?;

        tracing::info!(
            member_id = %updated.id,
            new_start = %updated.membership_start,
            new_end = %updated.membership_end,
            "Recomputed membership window from new start date"
        );
        Ok(updated)
    }

    /// Manual end-date correction: direct override, no recompute, payment
    /// history untouched.
    pub async fn set_end_date(
        &self,
        member_id: Uuid,
        new_end: DateTime<Utc>,
        actor: &AuthContext,
    ) -> Result<Member, BillingError> {
        self.require_admin(actor, "set end date")?;
        let covered_through = self.settled_coverage_end(member_id).await?;
        let now = self.clock.now();

        let updated = self
            .update_with_retry(member_id, |member| {
                member.membership_end = BsonDateTime::from_chrono(new_end);
                // An end date pushed past what payments covered reads as
                // pending on every path, list and detail alike.
                member.current_payment_status =
                    lifecycle::derive_payment_status(new_end, covered_through, now);
                Ok(())
            })
            .await?;

        tracing::info!(member_id = %updated.id, new_end = %updated.membership_end, "Overrode membership end date");
        Ok(updated)
    }

    // --- Lifecycle --------------------------------------------------------

    /// Explicit admin-controlled status transition. Destructive transitions
    /// are admin-only.
    pub async fn set_status(
        &self,
        member_id: Uuid,
        status: MemberStatus,
        actor: &AuthContext,
    ) -> Result<Member, BillingError> {
        if lifecycle::is_destructive(status) && !actor.role.is_admin() {
            return Err(BillingError::Unauthorized(format!(
                "user {} may not set status {status}",
                actor.user_id
            )));
        }

        let updated = self
            .update_with_retry(member_id, |member| {
                member.member_status = status;
                Ok(())
            })
            .await?;

        tracing::info!(member_id = %updated.id, status = %status, "Updated member status");
        Ok(updated)
    }

    /// Hard delete with payment cascade. Staff must suspend instead.
    pub async fn delete_member(
        &self,
        member_id: Uuid,
        actor: &AuthContext,
    ) -> Result<(), BillingError> {
        self.require_admin(actor, "delete members")?;
        self.load_member(member_id).await?;
        self.store.delete_member(member_id).await?;
        tracing::info!(member_id = %member_id, "Deleted member and payment history");
        Ok(())
    }

    // --- Expiry feed ------------------------------------------------------

    /// Members due or overdue within `days` of now; the sole feed for the
    /// reminder subsystem.
    pub async fn expiring_within(
        &self,
        days: i64,
    ) -> Result<Vec<ReminderEligibility>, BillingError> {
        let now = self.clock.now();
        let cutoff = expiry::window_end(now, days)?;
        let members = self
            .store
            .members_expiring_by(BsonDateTime::from_chrono(cutoff))
            .await?;
        Ok(expiry::evaluate(members, now))
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, BillingError> {
        let now = self.clock.now();
        let members = self.store.list_members(None).await?;

        let mut active = 0u64;
        let mut pending = 0u64;
        let mut expired = 0u64;
        let mut expiring_soon = 0u64;
        let soon_cutoff = now + chrono::Duration::days(7);
        for member in &members {
            let status = lifecycle::payment_status_as_of(
                member.current_payment_status,
                member.membership_end.to_chrono(),
                now,
            );
            match status {
                PaymentStatus::Paid => active += 1,
                PaymentStatus::Pending => pending += 1,
                PaymentStatus::Expired => expired += 1,
            }
            if status != PaymentStatus::Expired && member.membership_end.to_chrono() <= soon_cutoff
            {
                expiring_soon += 1;
            }
        }

        let month_start = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .unwrap_or(now);
        let monthly_revenue = self
            .store
            .list_payments()
            .await?
            .into_iter()
            .filter(|p| {
                p.status == PaymentRecordStatus::Settled
                    && p.payment_date.to_chrono() >= month_start
            })
            .map(|p| p.amount)
            .sum();

        Ok(DashboardStats {
            total_members: members.len() as u64,
            active_members: active,
            pending_members: pending,
            expired_members: expired,
            expiring_soon,
            monthly_revenue,
        })
    }

    // --- Pricing catalog --------------------------------------------------

    pub async fn catalog(&self) -> Result<PricingCatalog, BillingError> {
        self.store.load_catalog().await
    }

    pub async fn plan(&self, key: MembershipType) -> Result<MembershipPlan, BillingError> {
        let catalog = self.store.load_catalog().await?;
        catalog
            .plan(key)
            .cloned()
            .ok_or_else(|| BillingError::NotFound(format!("plan {key}")))
    }

    /// Admin-only plan mutation with optimistic versioning; one automatic
    /// retry on a concurrent catalog write.
    pub async fn set_plan(
        &self,
        key: MembershipType,
        patch: PlanPatch,
        actor: &AuthContext,
    ) -> Result<MembershipPlan, BillingError> {
        self.require_admin(actor, "edit the pricing catalog")?;
        validate_plan_patch(&patch)?;

        let mut attempt = 0;
        loop {
            let mut catalog = self.store.load_catalog().await?;
            let expected_version = catalog.version;
            {
                let plan = catalog
                    .plan_mut(key)
                    .ok_or_else(|| BillingError::NotFound(format!("plan {key}")))?;
                if let Some(name) = &patch.name {
                    plan.name = name.clone();
                }
                if let Some(days) = patch.duration_days {
                    plan.duration_days = days;
                }
                if let Some(price) = patch.first_time_price {
                    plan.first_time_price = price;
                }
                if let Some(price) = patch.renewal_price {
                    plan.renewal_price = price;
                }
                if let Some(flag) = patch.admission_fee_applicable {
                    plan.admission_fee_applicable = flag;
                }
            }
            catalog.updated_by = actor.user_id.clone();
            catalog.updated_at = self.bson_now();

            match self.store.save_catalog(catalog, expected_version).await {
                Ok(saved) => {
                    tracing::info!(plan = %key, updated_by = %actor.user_id, "Updated pricing plan");
                    return saved
                        .plan(key)
                        .cloned()
                        .ok_or_else(|| BillingError::NotFound(format!("plan {key}")));
                }
                Err(BillingError::ConcurrentModification(what)) if attempt == 0 => {
                    tracing::warn!(%what, "Version conflict, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Admin-only catalog-level settings update (gym identity, admission
    /// fee).
    pub async fn update_settings(
        &self,
        patch: SettingsPatch,
        actor: &AuthContext,
    ) -> Result<PricingCatalog, BillingError> {
        self.require_admin(actor, "edit settings")?;
        if let Some(fee) = patch.admission_fee_amount {
            if fee < Decimal::ZERO {
                return Err(BillingError::InvalidInput(format!(
                    "admission fee must be non-negative, got {fee}"
                )));
            }
        }

        let mut attempt = 0;
        loop {
            let mut catalog = self.store.load_catalog().await?;
            let expected_version = catalog.version;
            if let Some(name) = &patch.gym_name {
                catalog.gym_name = name.clone();
            }
            if let Some(address) = &patch.gym_address {
                catalog.gym_address = address.clone();
            }
            if let Some(phone) = &patch.gym_phone {
                catalog.gym_phone = phone.clone();
            }
            if let Some(email) = &patch.gym_email {
                catalog.gym_email = email.clone();
            }
            if let Some(fee) = patch.admission_fee_amount {
                catalog.admission_fee_amount = fee;
            }
            catalog.updated_by = actor.user_id.clone();
            catalog.updated_at = self.bson_now();

            match self.store.save_catalog(catalog, expected_version).await {
                Ok(saved) => {
                    tracing::info!(updated_by = %actor.user_id, "Updated gym settings");
                    return Ok(saved);
                }
                Err(BillingError::ConcurrentModification(what)) if attempt == 0 => {
                    tracing::warn!(%what, "Version conflict, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn require_admin(&self, actor: &AuthContext, action: &str) -> Result<(), BillingError> {
        if actor.role.is_admin() {
            Ok(())
        } else {
            Err(BillingError::Unauthorized(format!(
                "user {} may not {action}",
                actor.user_id
            )))
        }
    }
}

fn validate_plan_patch(patch: &PlanPatch) -> Result<(), BillingError> {
    if let Some(days) = patch.duration_days {
        if days <= 0 {
            return Err(BillingError::InvalidInput(format!(
                "duration_days must be positive, got {days}"
            )));
        }
    }
    for (field, price) in [
        ("first_time_price", patch.first_time_price),
        ("renewal_price", patch.renewal_price),
    ] {
        if let Some(price) = price {
            if price <= Decimal::ZERO {
                return Err(BillingError::InvalidInput(format!(
                    "{field} must be positive, got {price}"
                )));
            }
        }
    }
    Ok(())
}
