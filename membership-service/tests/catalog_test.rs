//! Pricing catalog integration tests: seeding, admin gating, validation, and
//! versioned writes.

mod common;

use common::{admin, draft, staff, TestHarness};
use membership_service::billing::BillingError;
use membership_service::models::{MembershipType, PlanPatch, SettingsPatch};
use membership_service::services::MembershipStore;
use rust_decimal::Decimal;

#[tokio::test]
async fn default_catalog_is_seeded_on_first_read() {
    let h = TestHarness::new();
    let catalog = h.orchestrator.catalog().await.unwrap();

    assert_eq!(catalog.plans.len(), 3);
    let monthly = catalog.plan(MembershipType::Monthly).unwrap();
    assert_eq!(monthly.first_time_price, Decimal::from(2500));
    assert_eq!(monthly.renewal_price, Decimal::from(1000));
    assert!(monthly.admission_fee_applicable);
    assert_eq!(catalog.admission_fee_amount, Decimal::from(2000));
}

#[tokio::test]
async fn plan_edits_are_admin_only() {
    let h = TestHarness::new();

    let patch = PlanPatch {
        renewal_price: Some(Decimal::from(1200)),
        ..Default::default()
    };

    let err = h
        .orchestrator
        .set_plan(MembershipType::Monthly, patch.clone(), &staff())
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::Unauthorized(_)));

    // The rejected write must leave the catalog untouched.
    let catalog = h.orchestrator.catalog().await.unwrap();
    assert_eq!(
        catalog.plan(MembershipType::Monthly).unwrap().renewal_price,
        Decimal::from(1000)
    );

    let plan = h
        .orchestrator
        .set_plan(MembershipType::Monthly, patch, &admin())
        .await
        .unwrap();
    assert_eq!(plan.renewal_price, Decimal::from(1200));
}

#[tokio::test]
async fn edited_renewal_price_drives_subsequent_extensions() {
    let h = TestHarness::new();
    let member = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();
    let old_end = member.membership_end.to_chrono();

    h.orchestrator
        .set_plan(
            MembershipType::Monthly,
            PlanPatch {
                renewal_price: Some(Decimal::from(1200)),
                ..Default::default()
            },
            &admin(),
        )
        .await
        .unwrap();

    // The old amount no longer matches any rule; the new one does.
    let old_amount = membership_service::services::PaymentIntake {
        member_id: member.id,
        amount: Decimal::from(1000),
        payment_method: membership_service::models::PaymentMethod::Cash,
        description: "Renewal".to_string(),
        transaction_id: None,
        extension_days: None,
    };
    let err = h.orchestrator.record_payment(old_amount).await.unwrap_err();
    assert!(matches!(err, BillingError::UnknownAmount(_)));

    let new_amount = membership_service::services::PaymentIntake {
        member_id: member.id,
        amount: Decimal::from(1200),
        payment_method: membership_service::models::PaymentMethod::Cash,
        description: "Renewal".to_string(),
        transaction_id: None,
        extension_days: None,
    };
    let (updated, _) = h.orchestrator.record_payment(new_amount).await.unwrap();
    assert_eq!(
        updated.membership_end.to_chrono(),
        old_end + chrono::Duration::days(30)
    );
}

#[tokio::test]
async fn non_positive_plan_values_are_rejected() {
    let h = TestHarness::new();

    for patch in [
        PlanPatch {
            duration_days: Some(0),
            ..Default::default()
        },
        PlanPatch {
            first_time_price: Some(Decimal::from(-1)),
            ..Default::default()
        },
        PlanPatch {
            renewal_price: Some(Decimal::ZERO),
            ..Default::default()
        },
    ] {
        let err = h
            .orchestrator
            .set_plan(MembershipType::Monthly, patch, &admin())
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::InvalidInput(_)));
    }
}

#[tokio::test]
async fn settings_update_changes_the_admission_fee_for_new_enrollments() {
    let h = TestHarness::new();

    h.orchestrator
        .update_settings(
            SettingsPatch {
                gym_name: Some("Steel Temple".to_string()),
                admission_fee_amount: Some(Decimal::from(1500)),
                ..Default::default()
            },
            &admin(),
        )
        .await
        .unwrap();

    let catalog = h.orchestrator.catalog().await.unwrap();
    assert_eq!(catalog.gym_name, "Steel Temple");

    let member = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();
    assert_eq!(member.admission_fee_amount, Decimal::from(1500));
    assert_eq!(member.total_amount_due, Decimal::from(4000));
}

#[tokio::test]
async fn settings_updates_are_admin_only() {
    let h = TestHarness::new();
    let err = h
        .orchestrator
        .update_settings(
            SettingsPatch {
                gym_name: Some("Nope".to_string()),
                ..Default::default()
            },
            &staff(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::Unauthorized(_)));
}

#[tokio::test]
async fn stale_catalog_version_is_rejected_by_the_store() {
    let h = TestHarness::new();
    let catalog = h.orchestrator.catalog().await.unwrap();

    // First write bumps the version.
    h.store
        .save_catalog(catalog.clone(), catalog.version)
        .await
        .unwrap();

    // A second write with the stale version must fail.
    let err = h
        .store
        .save_catalog(catalog.clone(), catalog.version)
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::ConcurrentModification(_)));
}

#[tokio::test]
async fn fee_snapshots_survive_catalog_changes() {
    let h = TestHarness::new();
    let member = h
        .orchestrator
        .enroll(draft(MembershipType::Monthly))
        .await
        .unwrap();

    h.orchestrator
        .set_plan(
            MembershipType::Monthly,
            PlanPatch {
                first_time_price: Some(Decimal::from(9999)),
                ..Default::default()
            },
            &admin(),
        )
        .await
        .unwrap();

    // Already-enrolled members keep the fees computed at enrollment time.
    let reloaded = h.orchestrator.member(member.id).await.unwrap();
    assert_eq!(reloaded.monthly_fee_amount, Decimal::from(2500));
    assert_eq!(reloaded.total_amount_due, Decimal::from(4500));
}
