//! MongoDB-backed membership store.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime};
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use uuid::Uuid;

use crate::billing::BillingError;
use crate::models::{Member, MemberStatus, PaymentRecord, PricingCatalog, CATALOG_ID};

use super::store::MembershipStore;

#[derive(Clone)]
pub struct MongoMembershipStore {
    client: Client,
    db: Database,
    members: Collection<Member>,
    payments: Collection<PaymentRecord>,
    settings: Collection<PricingCatalog>,
}

impl MongoMembershipStore {
    pub fn new(client: Client, db: Database) -> Self {
        Self {
            members: db.collection("members"),
            payments: db.collection("payments"),
            settings: db.collection("gym_settings"),
            client,
            db,
        }
    }

    /// Initialize indexes for expiry-window and ledger queries.
    pub async fn init_indexes(&self) -> Result<(), BillingError> {
        let expiry_index = IndexModel::builder()
            .keys(doc! { "membership_end": 1 })
            .options(
                IndexOptions::builder()
                    .name("membership_end_idx".to_string())
                    .build(),
            )
            .build();

        let status_index = IndexModel::builder()
            .keys(doc! { "member_status": 1 })
            .options(
                IndexOptions::builder()
                    .name("member_status_idx".to_string())
                    .build(),
            )
            .build();

        self.members
            .create_indexes([expiry_index, status_index], None)
            .await?;

        let member_payments_index = IndexModel::builder()
            .keys(doc! { "member_id": 1, "payment_date": -1 })
            .options(
                IndexOptions::builder()
                    .name("member_payments_idx".to_string())
                    .build(),
            )
            .build();

        self.payments
            .create_indexes([member_payments_index], None)
            .await?;

        tracing::info!("Membership store indexes initialized");
        Ok(())
    }

    fn bump(member: Member, expected_version: i64) -> Member {
        let mut updated = member;
        updated.version = expected_version + 1;
        updated
    }
}

#[async_trait]
impl MembershipStore for MongoMembershipStore {
    async fn load_catalog(&self) -> Result<PricingCatalog, BillingError> {
        if let Some(catalog) = self.settings.find_one(doc! { "_id": CATALOG_ID }, None).await? {
            return Ok(catalog);
        }

        let seeded = PricingCatalog::default_catalog(DateTime::now());
        match self.settings.insert_one(&seeded, None).await {
            Ok(_) => {
                tracing::info!("Seeded default pricing catalog");
                Ok(seeded)
            }
            // Lost the seeding race to another instance; read theirs.
            Err(_) => self
                .settings
                .find_one(doc! { "_id": CATALOG_ID }, None)
                .await?
                .ok_or_else(|| {
                    BillingError::Storage(anyhow::anyhow!("pricing catalog missing after seed"))
                }),
        }
    }

    async fn save_catalog(
        &self,
        catalog: PricingCatalog,
        expected_version: i64,
    ) -> Result<PricingCatalog, BillingError> {
        let mut updated = catalog;
        updated.version = expected_version + 1;

        let filter = doc! { "_id": CATALOG_ID, "version": expected_version };
        let result = self.settings.replace_one(filter, &updated, None).await?;
        if result.matched_count == 0 {
            return Err(BillingError::ConcurrentModification(
                "pricing catalog".to_string(),
            ));
        }
        Ok(updated)
    }

    async fn insert_member_with_charge(
        &self,
        member: Member,
        charge: PaymentRecord,
    ) -> Result<(), BillingError> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        if let Err(e) = async {
            self.members
                .insert_one_with_session(&member, None, &mut session)
                .await?;
            self.payments
                .insert_one_with_session(&charge, None, &mut session)
                .await?;
            Ok::<_, mongodb::error::Error>(())
        }
        .await
        {
            session.abort_transaction().await.ok();
            return Err(e.into());
        }

        session.commit_transaction().await?;
        Ok(())
    }

    async fn get_member(&self, id: Uuid) -> Result<Option<Member>, BillingError> {
        let member = self
            .members
            .find_one(doc! { "_id": id.to_string() }, None)
            .await?;
        Ok(member)
    }

    async fn list_members(
        &self,
        status: Option<MemberStatus>,
    ) -> Result<Vec<Member>, BillingError> {
        let filter = match status {
            Some(status) => doc! { "member_status": status.as_str() },
            None => doc! {},
        };
        let members = self.members.find(filter, None).await?.try_collect().await?;
        Ok(members)
    }

    async fn update_member(
        &self,
        member: Member,
        expected_version: i64,
    ) -> Result<Member, BillingError> {
        let updated = Self::bump(member, expected_version);
        let filter = doc! { "_id": updated.id.to_string(), "version": expected_version };

        let result = self.members.replace_one(filter, &updated, None).await?;
        if result.matched_count == 0 {
            return match self.get_member(updated.id).await? {
                Some(_) => Err(BillingError::ConcurrentModification(format!(
                    "member {}",
                    updated.id
                ))),
                None => Err(BillingError::NotFound(format!("member {}", updated.id))),
            };
        }
        Ok(updated)
    }

    async fn commit_payment(
        &self,
        member: Member,
        expected_version: i64,
        payment: PaymentRecord,
    ) -> Result<(Member, PaymentRecord), BillingError> {
        let updated = Self::bump(member, expected_version);
        let filter = doc! { "_id": updated.id.to_string(), "version": expected_version };

        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        let outcome = async {
            let result = self
                .members
                .replace_one_with_session(filter, &updated, None, &mut session)
                .await?;
            if result.matched_count == 0 {
                return Ok(false);
            }
            self.payments
                .insert_one_with_session(&payment, None, &mut session)
                .await?;
            Ok::<_, mongodb::error::Error>(true)
        }
        .await;

        match outcome {
            Ok(true) => {
                session.commit_transaction().await?;
                Ok((updated, payment))
            }
            Ok(false) => {
                session.abort_transaction().await.ok();
                match self.get_member(updated.id).await? {
                    Some(_) => Err(BillingError::ConcurrentModification(format!(
                        "member {}",
                        updated.id
                    ))),
                    None => Err(BillingError::NotFound(format!("member {}", updated.id))),
                }
            }
            Err(e) => {
                session.abort_transaction().await.ok();
                Err(e.into())
            }
        }
    }

    async fn delete_member(&self, id: Uuid) -> Result<(), BillingError> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        if let Err(e) = async {
            self.members
                .delete_one_with_session(doc! { "_id": id.to_string() }, None, &mut session)
                .await?;
            self.payments
                .delete_many_with_session(
                    doc! { "member_id": id.to_string() },
                    None,
                    &mut session,
                )
                .await?;
            Ok::<_, mongodb::error::Error>(())
        }
        .await
        {
            session.abort_transaction().await.ok();
            return Err(e.into());
        }

        session.commit_transaction().await?;
        Ok(())
    }

    async fn payments_for_member(
        &self,
        member_id: Uuid,
    ) -> Result<Vec<PaymentRecord>, BillingError> {
        let options = FindOptions::builder()
            .sort(doc! { "payment_date": -1 })
            .build();
        let payments = self
            .payments
            .find(doc! { "member_id": member_id.to_string() }, options)
            .await?
            .try_collect()
            .await?;
        Ok(payments)
    }

    async fn list_payments(&self) -> Result<Vec<PaymentRecord>, BillingError> {
        let options = FindOptions::builder()
            .sort(doc! { "payment_date": -1 })
            .build();
        let payments = self
            .payments
            .find(doc! {}, options)
            .await?
            .try_collect()
            .await?;
        Ok(payments)
    }

    async fn members_expiring_by(&self, cutoff: DateTime) -> Result<Vec<Member>, BillingError> {
        let members = self
            .members
            .find(doc! { "membership_end": { "$lte": cutoff } }, None)
            .await?
            .try_collect()
            .await?;
        Ok(members)
    }

    async fn health_check(&self) -> Result<(), BillingError> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}
