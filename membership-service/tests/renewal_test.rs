//! Renewal integration tests: amount-to-extension mapping, anchoring at the
//! previous end date, and optimistic-versioning conflicts.

mod common;

use chrono::Duration;
use common::{admin, draft, TestHarness};
use membership_service::billing::BillingError;
use membership_service::models::{
    MemberStatus, MembershipType, PaymentMethod, PaymentRecordStatus, PaymentStatus,
};
use membership_service::services::{MembershipStore, PaymentIntake};
use rust_decimal::Decimal;

fn intake(member_id: uuid::Uuid, amount: i64) -> PaymentIntake {
    PaymentIntake {
        member_id,
        amount: Decimal::from(amount),
        payment_method: PaymentMethod::Cash,
        description: "Membership renewal".to_string(),
        transaction_id: None,
        extension_days: None,
    }
}

#[tokio::test]
async fn renewal_amounts_map_to_extensions() {
    for (amount, days) in [(1000, 30), (3000, 90), (5500, 180)] {
        let h = TestHarness::new();
        let member = h
            .orchestrator
            .enroll(draft(MembershipType::Monthly))
            .await
            .unwrap();
        let old_end = member.membership_end.to_chrono();

        let (updated, payment) = h
            .orchestrator
            .record_payment(intake(member.id, amount))
            .await
            .unwrap();

        assert_eq!(
            updated.membership_end.to_chrono(),
            old_end + Duration::days(days)
        );
        assert_eq!(payment.extension_days_applied, Some(days));
        assert_eq!(payment.anchor_date_used.unwrap().to_chrono(), old_end);
        assert_eq!(payment.status, PaymentRecordStatus::Settled);
        assert_eq!(updated.current_payment_status, PaymentStatus::Paid);
    }
}

#[tokio::test]
async fn early_payment_anchors_at_previous_end_not_today() {
    let h = TestHarness::new();
    let member = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();
    let old_end = member.membership_end.to_chrono();

    // Pay 20 days before the membership ends; no days may be lost.
    h.clock.advance_days(10);
    let (updated, _) = h
        .orchestrator
        .record_payment(intake(member.id, 1000))
        .await
        .unwrap();

    assert_eq!(
        updated.membership_end.to_chrono(),
        old_end + Duration::days(30)
    );
}

#[tokio::test]
async fn late_payment_still_anchors_at_previous_end() {
    let h = TestHarness::new();
    let member = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();
    let old_end = member.membership_end.to_chrono();

    // 40 days in the membership has been expired for 10 days. The grace
    // is not free: the extension is still measured from the old end.
    h.clock.advance_days(40);
    let (updated, payment) = h
        .orchestrator
        .record_payment(intake(member.id, 1000))
        .await
        .unwrap();

    assert_eq!(payment.anchor_date_used.unwrap().to_chrono(), old_end);
    assert_eq!(
        updated.membership_end.to_chrono(),
        old_end + Duration::days(30)
    );
}

#[tokio::test]
async fn unknown_amount_is_rejected_without_explicit_days() {
    let h = TestHarness::new();
    let member = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();

    let err = h
        .orchestrator
        .record_payment(intake(member.id, 1234))
        .await
        .unwrap_err();

    assert!(matches!(err, BillingError::UnknownAmount(_)));

    // No ledger entry and no date change may leak out of the rejection.
    let reloaded = h.orchestrator.member(member.id).await.unwrap();
    assert_eq!(reloaded.membership_end, member.membership_end);
    let payments = h.orchestrator.member_payments(member.id).await.unwrap();
    assert_eq!(payments.len(), 1); // enrollment charge only
}

#[tokio::test]
async fn explicit_extension_days_override_the_amount_table() {
    let h = TestHarness::new();
    let member = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();
    let old_end = member.membership_end.to_chrono();

    let mut custom = intake(member.id, 1234);
    custom.extension_days = Some(45);

    let (updated, payment) = h.orchestrator.record_payment(custom).await.unwrap();

    assert_eq!(payment.extension_days_applied, Some(45));
    assert_eq!(
        updated.membership_end.to_chrono(),
        old_end + Duration::days(45)
    );
}

#[tokio::test]
async fn payment_reactivates_an_inactive_member() {
    let h = TestHarness::new();
    let member = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();

    h.orchestrator
        .set_status(member.id, MemberStatus::Inactive, &admin())
        .await
        .unwrap();

    let (updated, _) = h
        .orchestrator
        .record_payment(intake(member.id, 1000))
        .await
        .unwrap();

    assert_eq!(updated.member_status, MemberStatus::Active);
}

#[tokio::test]
async fn stale_version_write_is_rejected_by_the_store() {
    let h = TestHarness::new();
    let member = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();

    // First write with the observed version succeeds and bumps it.
    let mut first = member.clone();
    first.phone = "+91-9000000009".to_string();
    h.store.update_member(first, member.version).await.unwrap();

    // A second write carrying the old version must be rejected.
    let mut second = member.clone();
    second.phone = "+91-9000000010".to_string();
    let err = h
        .store
        .update_member(second, member.version)
        .await
        .unwrap_err();

    assert!(matches!(err, BillingError::ConcurrentModification(_)));
}

#[tokio::test]
async fn payment_lands_cleanly_after_a_concurrent_edit() {
    let h = TestHarness::new();
    let member = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();
    let old_end = member.membership_end.to_chrono();

    // Another writer bumps the version before the payment lands; the
    // orchestrator reloads and the payment still extends from the stored end.
    let mut edited = member.clone();
    edited.phone = "+91-9000000011".to_string();
    h.store.update_member(edited, member.version).await.unwrap();

    let (updated, _) = h
        .orchestrator
        .record_payment(intake(member.id, 1000))
        .await
        .unwrap();

    assert_eq!(
        updated.membership_end.to_chrono(),
        old_end + Duration::days(30)
    );
    assert_eq!(updated.phone, "+91-9000000011");
}
