//! Enrollment integration tests: fee snapshots, membership windows, and the
//! outstanding enrollment charge.

mod common;

use chrono::Duration;
use common::{draft, test_epoch, TestHarness};
use membership_service::models::{
    MemberStatus, MembershipType, PaymentRecordStatus, PaymentStatus,
};
use rust_decimal::Decimal;

#[tokio::test]
async fn monthly_enrollment_charges_admission_fee() {
    let h = TestHarness::new();

    let member = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();

    assert_eq!(member.monthly_fee_amount, Decimal::from(2500));
    assert_eq!(member.admission_fee_amount, Decimal::from(2000));
    assert_eq!(member.total_amount_due, Decimal::from(4500));
    assert_eq!(member.member_status, MemberStatus::Active);
    assert_eq!(member.current_payment_status, PaymentStatus::Pending);
    assert_eq!(
        member.membership_end.to_chrono(),
        test_epoch() + Duration::days(30)
    );
}

#[tokio::test]
async fn quarterly_enrollment_has_no_admission_fee() {
    let h = TestHarness::new();

    let member = h
        .orchestrator
        .enroll(draft(MembershipType::Quarterly))
        .await
        .unwrap();

    assert_eq!(member.monthly_fee_amount, Decimal::from(3500));
    assert_eq!(member.admission_fee_amount, Decimal::ZERO);
    assert_eq!(member.total_amount_due, Decimal::from(3500));
    assert_eq!(
        member.membership_end.to_chrono(),
        test_epoch() + Duration::days(90)
    );
}

#[tokio::test]
async fn six_monthly_enrollment_window_is_180_days() {
    let h = TestHarness::new();

    let member = h
        .orchestrator
        .enroll(draft(MembershipType::SixMonthly))
        .await
        .unwrap();

    assert_eq!(member.total_amount_due, Decimal::from(6000));
    assert_eq!(
        member.membership_end.to_chrono(),
        test_epoch() + Duration::days(180)
    );
}

#[tokio::test]
async fn enrollment_raises_an_outstanding_charge() {
    let h = TestHarness::new();

    let member = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();

    let payments = h.orchestrator.member_payments(member.id).await.unwrap();
    assert_eq!(payments.len(), 1);

    let charge = &payments[0];
    assert_eq!(charge.amount, Decimal::from(4500));
    assert_eq!(charge.status, PaymentRecordStatus::Outstanding);
    assert!(charge.payment_method.is_none());
    assert!(charge.extension_days_applied.is_none());
}

#[tokio::test]
async fn backdated_join_date_shifts_the_window() {
    let h = TestHarness::new();

    let join = test_epoch() - Duration::days(10);
    let mut d = draft(MembershipType::Monthly);
    d.join_date = Some(join);

    let member = h.orchestrator.enroll(d).await.unwrap();

    assert_eq!(member.membership_start.to_chrono(), join);
    assert_eq!(member.membership_end.to_chrono(), join + Duration::days(30));
}

#[tokio::test]
async fn fresh_enrollment_reads_as_pending_until_paid() {
    let h = TestHarness::new();

    let enrolled = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();

    let member = h.orchestrator.member(enrolled.id).await.unwrap();
    assert_eq!(member.current_payment_status, PaymentStatus::Pending);
}
