//! PostgreSQL implementation of PurchaseRepository.
//!
//! `record` inserts the buyer's contact copy, the purchase row and the
//! share's counter bump in one transaction. The `purchases_buyer_share_key`
//! constraint decides concurrent races; the loser's transaction rolls back
//! whole, leaving no orphan copy behind.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    ContactId, DomainError, PaymentId, PurchaseId, ShareId, Timestamp, UserId,
};
use crate::domain::purchase::Purchase;
use crate::domain::sharing::ContactSnapshot;
use crate::ports::PurchaseRepository;

use super::{db_error, map_write_error, money_from_row};

const PURCHASE_COLUMNS: &str = r#"
    id, share_id, buyer_id, seller_id, copied_contact_id, payment_id, amount_minor, currency,
    created_at
"#;

pub struct PostgresPurchaseRepository {
    pool: PgPool,
}

impl PostgresPurchaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    id: Uuid,
    share_id: Uuid,
    buyer_id: Uuid,
    seller_id: Uuid,
    copied_contact_id: Uuid,
    payment_id: Option<Uuid>,
    amount_minor: i64,
    currency: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PurchaseRow> for Purchase {
    type Error = DomainError;

    fn try_from(row: PurchaseRow) -> Result<Self, Self::Error> {
        Ok(Purchase {
            id: PurchaseId::from_uuid(row.id),
            share_id: ShareId::from_uuid(row.share_id),
            buyer_id: UserId::from_uuid(row.buyer_id),
            seller_id: UserId::from_uuid(row.seller_id),
            copied_contact_id: ContactId::from_uuid(row.copied_contact_id),
            payment_id: row.payment_id.map(PaymentId::from_uuid),
            amount_paid: money_from_row(row.amount_minor, &row.currency)?,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl PurchaseRepository for PostgresPurchaseRepository {
    async fn record(
        &self,
        purchase: &Purchase,
        snapshot: &ContactSnapshot,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin purchase transaction"))?;

        let fields = serde_json::to_value(snapshot.stored_fields())
            .map_err(|e| DomainError::database("Failed to encode contact copy", e))?;

        sqlx::query(
            r#"
            INSERT INTO contacts (id, owner_id, fields, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            "#,
        )
        .bind(purchase.copied_contact_id.as_uuid())
        .bind(purchase.buyer_id.as_uuid())
        .bind(fields)
        .bind(purchase.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to write contact copy"))?;

        sqlx::query(
            r#"
            INSERT INTO purchases (
                id, share_id, buyer_id, seller_id, copied_contact_id, payment_id,
                amount_minor, currency, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(purchase.id.as_uuid())
        .bind(purchase.share_id.as_uuid())
        .bind(purchase.buyer_id.as_uuid())
        .bind(purchase.seller_id.as_uuid())
        .bind(purchase.copied_contact_id.as_uuid())
        .bind(purchase.payment_id.map(|id| *id.as_uuid()))
        .bind(purchase.amount_paid.minor)
        .bind(purchase.amount_paid.currency.code())
        .bind(purchase.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                "Failed to save purchase",
                &["purchases_buyer_share_key"],
                "Buyer already owns this share",
            )
        })?;

        sqlx::query(
            "UPDATE contact_shares SET purchase_count = purchase_count + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(purchase.share_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to count share purchase"))?;

        tx.commit()
            .await
            .map_err(|e| {
                map_write_error(
                    e,
                    "Failed to commit purchase",
                    &["purchases_buyer_share_key"],
                    "Buyer already owns this share",
                )
            })?;

        Ok(())
    }

    async fn find_by_buyer_and_share(
        &self,
        buyer_id: &UserId,
        share_id: &ShareId,
    ) -> Result<Option<Purchase>, DomainError> {
        let sql = format!(
            "SELECT {} FROM purchases WHERE buyer_id = $1 AND share_id = $2",
            PURCHASE_COLUMNS
        );
        let row: Option<PurchaseRow> = sqlx::query_as(&sql)
            .bind(buyer_id.as_uuid())
            .bind(share_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch purchase"))?;
        row.map(Purchase::try_from).transpose()
    }

    async fn list_by_buyer(
        &self,
        buyer_id: &UserId,
        limit: u32,
    ) -> Result<Vec<Purchase>, DomainError> {
        let sql = format!(
            "SELECT {} FROM purchases WHERE buyer_id = $1 ORDER BY created_at DESC LIMIT $2",
            PURCHASE_COLUMNS
        );
        let rows: Vec<PurchaseRow> = sqlx::query_as(&sql)
            .bind(buyer_id.as_uuid())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list purchases"))?;
        rows.into_iter().map(Purchase::try_from).collect()
    }
}
