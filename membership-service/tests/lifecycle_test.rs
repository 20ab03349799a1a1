//! Lifecycle integration tests: admin-controlled member status, derived
//! payment status, and the delete cascade.

mod common;

use common::{admin, draft, staff, TestHarness};
use membership_service::billing::BillingError;
use membership_service::models::{
    MemberStatus, MembershipType, PaymentMethod, PaymentStatus,
};
use membership_service::services::PaymentIntake;
use rust_decimal::Decimal;

#[tokio::test]
async fn staff_may_freeze_but_not_suspend() {
    let h = TestHarness::new();
    let member = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();

    let frozen = h
        .orchestrator
        .set_status(member.id, MemberStatus::Frozen, &staff())
        .await
        .unwrap();
    assert_eq!(frozen.member_status, MemberStatus::Frozen);

    for blocked in [MemberStatus::Suspended, MemberStatus::Inactive] {
        let err = h
            .orchestrator
            .set_status(member.id, blocked, &staff())
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::Unauthorized(_)));
    }
}

#[tokio::test]
async fn admin_may_suspend_and_deactivate() {
    let h = TestHarness::new();
    let member = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();

    let suspended = h
        .orchestrator
        .set_status(member.id, MemberStatus::Suspended, &admin())
        .await
        .unwrap();
    assert_eq!(suspended.member_status, MemberStatus::Suspended);

    let inactive = h
        .orchestrator
        .set_status(member.id, MemberStatus::Inactive, &admin())
        .await
        .unwrap();
    assert_eq!(inactive.member_status, MemberStatus::Inactive);
}

#[tokio::test]
async fn payment_status_follows_the_ledger_and_the_calendar() {
    let h = TestHarness::new();
    let enrolled = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();

    // Pending until the first real payment.
    let member = h.orchestrator.member(enrolled.id).await.unwrap();
    assert_eq!(member.current_payment_status, PaymentStatus::Pending);

    h.orchestrator
        .record_payment(PaymentIntake {
            member_id: enrolled.id,
            amount: Decimal::from(1000),
            payment_method: PaymentMethod::Upi,
            description: "Renewal".to_string(),
            transaction_id: None,
            extension_days: None,
        })
        .await
        .unwrap();

    let member = h.orchestrator.member(enrolled.id).await.unwrap();
    assert_eq!(member.current_payment_status, PaymentStatus::Paid);

    // Past the extended end date (30 + 30 days) the status reads expired,
    // while the admin-controlled member status is untouched.
    h.clock.advance_days(61);
    let member = h.orchestrator.member(enrolled.id).await.unwrap();
    assert_eq!(member.current_payment_status, PaymentStatus::Expired);
    assert_eq!(member.member_status, MemberStatus::Active);
}

#[tokio::test]
async fn list_projection_expires_lapsed_members() {
    let h = TestHarness::new();
    h.orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();

    h.clock.advance_days(31);
    let members = h.orchestrator.members(None).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(
        members[0].current_payment_status,
        PaymentStatus::Expired
    );
}

#[tokio::test]
async fn list_filters_by_member_status() {
    let h = TestHarness::new();
    let a = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();
    let mut d = draft(MembershipType::Quarterly);
    d.email = "b@example.com".to_string();
    h.orchestrator.enroll(d).await.unwrap();

    h.orchestrator
        .set_status(a.id, MemberStatus::Frozen, &admin())
        .await
        .unwrap();

    let frozen = h
        .orchestrator
        .members(Some(MemberStatus::Frozen))
        .await
        .unwrap();
    assert_eq!(frozen.len(), 1);
    assert_eq!(frozen[0].id, a.id);
}

#[tokio::test]
async fn moving_the_end_date_forward_resets_paid_to_pending() {
    let h = TestHarness::new();
    let member = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();

    h.orchestrator
        .record_payment(PaymentIntake {
            member_id: member.id,
            amount: Decimal::from(1000),
            payment_method: PaymentMethod::Cash,
            description: "Renewal".to_string(),
            transaction_id: None,
            extension_days: None,
        })
        .await
        .unwrap();

    // Admin pushes the end date past what the payment covered.
    let far_end = common::test_epoch() + chrono::Duration::days(365);
    h.orchestrator
        .set_end_date(member.id, far_end, &admin())
        .await
        .unwrap();

    let reloaded = h.orchestrator.member(member.id).await.unwrap();
    assert_eq!(reloaded.membership_end.to_chrono(), far_end);
    assert_eq!(reloaded.current_payment_status, PaymentStatus::Pending);
}

#[tokio::test]
async fn list_and_detail_agree_after_an_end_date_override() {
    let h = TestHarness::new();
    let member = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();

    h.orchestrator
        .record_payment(PaymentIntake {
            member_id: member.id,
            amount: Decimal::from(1000),
            payment_method: PaymentMethod::Cash,
            description: "Renewal".to_string(),
            transaction_id: None,
            extension_days: None,
        })
        .await
        .unwrap();

    // Paid member, end moved 90 days beyond what the payment covered. Both
    // read paths must report the same status for the same member.
    let new_end = common::test_epoch() + chrono::Duration::days(150);
    h.orchestrator
        .set_end_date(member.id, new_end, &admin())
        .await
        .unwrap();

    let detail = h.orchestrator.member(member.id).await.unwrap();
    let listed = h.orchestrator.members(None).await.unwrap();
    let from_list = listed.iter().find(|m| m.id == member.id).unwrap();

    assert_eq!(detail.current_payment_status, PaymentStatus::Pending);
    assert_eq!(
        from_list.current_payment_status,
        detail.current_payment_status
    );
}

#[tokio::test]
async fn delete_is_admin_only_and_cascades_payments() {
    let h = TestHarness::new();
    let member = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();

    let err = h
        .orchestrator
        .delete_member(member.id, &staff())
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::Unauthorized(_)));

    h.orchestrator
        .delete_member(member.id, &admin())
        .await
        .unwrap();

    let err = h.orchestrator.member(member.id).await.unwrap_err();
    assert!(matches!(err, BillingError::NotFound(_)));

    // The global ledger no longer carries the member's records.
    let payments = h.orchestrator.list_payments().await.unwrap();
    assert!(payments.iter().all(|p| p.member_id != member.id));
}
