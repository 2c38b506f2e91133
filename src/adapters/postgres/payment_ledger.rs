//! PostgreSQL implementation of PaymentLedgerRepository.
//!
//! Status changes are a single `UPDATE ... WHERE status = $expected`, so
//! two deliveries racing on the same intent cannot both move it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, PaymentId, ShareId, SubscriptionId, Timestamp, UserId,
};
use crate::domain::payment::{PaymentIntent, PaymentStatus, PaymentTarget, Provider};
use crate::domain::subscription::Plan;
use crate::ports::PaymentLedgerRepository;

use super::{db_error, map_write_error, money_from_row, parse_column};

const PAYMENT_COLUMNS: &str = r#"
    id, payer_id, target_kind, share_id, plan, subscription_id, provider, status,
    amount_minor, currency, description, correlation_id, confirmation_url, provider_payload,
    settled_at, created_at, updated_at
"#;

pub struct PostgresPaymentLedger {
    pool: PgPool,
}

impl PostgresPaymentLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    payer_id: Uuid,
    target_kind: String,
    share_id: Option<Uuid>,
    plan: Option<String>,
    subscription_id: Option<Uuid>,
    provider: String,
    status: String,
    amount_minor: i64,
    currency: String,
    description: Option<String>,
    correlation_id: Option<String>,
    confirmation_url: Option<String>,
    provider_payload: Option<Value>,
    settled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for PaymentIntent {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let target = match (row.target_kind.as_str(), row.share_id, row.plan.as_deref()) {
            ("share", Some(share_id), _) => PaymentTarget::Share {
                share_id: ShareId::from_uuid(share_id),
            },
            ("subscription", _, Some(plan)) => PaymentTarget::Subscription {
                plan: parse_column::<Plan>("plan", plan)?,
                subscription_id: row.subscription_id.map(SubscriptionId::from_uuid),
            },
            (kind, _, _) => {
                return Err(DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Invalid payment target: {}", kind),
                ))
            }
        };

        Ok(PaymentIntent {
            id: PaymentId::from_uuid(row.id),
            payer_id: UserId::from_uuid(row.payer_id),
            target,
            provider: parse_column::<Provider>("provider", &row.provider)?,
            status: parse_column::<PaymentStatus>("status", &row.status)?,
            amount: money_from_row(row.amount_minor, &row.currency)?,
            description: row.description,
            correlation_id: row.correlation_id,
            confirmation_url: row.confirmation_url,
            provider_payload: row.provider_payload,
            settled_at: row.settled_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

/// Column values for a target: (kind, share_id, plan, subscription_id).
fn target_columns(
    target: &PaymentTarget,
) -> (&'static str, Option<Uuid>, Option<&'static str>, Option<Uuid>) {
    match target {
        PaymentTarget::Share { share_id } => ("share", Some(*share_id.as_uuid()), None, None),
        PaymentTarget::Subscription {
            plan,
            subscription_id,
        } => (
            "subscription",
            None,
            Some(plan.as_str()),
            subscription_id.map(|id| *id.as_uuid()),
        ),
    }
}

fn payment_not_found(id: &PaymentId) -> DomainError {
    DomainError::new(ErrorCode::PaymentNotFound, "Payment not found")
        .with_detail("payment_id", id.to_string())
}

#[async_trait]
impl PaymentLedgerRepository for PostgresPaymentLedger {
    async fn save(&self, intent: &PaymentIntent) -> Result<(), DomainError> {
        let (kind, share_id, plan, subscription_id) = target_columns(&intent.target);

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, payer_id, target_kind, share_id, plan, subscription_id, provider, status,
                amount_minor, currency, description, correlation_id, confirmation_url,
                provider_payload, settled_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(intent.id.as_uuid())
        .bind(intent.payer_id.as_uuid())
        .bind(kind)
        .bind(share_id)
        .bind(plan)
        .bind(subscription_id)
        .bind(intent.provider.as_str())
        .bind(intent.status.as_str())
        .bind(intent.amount.minor)
        .bind(intent.amount.currency.code())
        .bind(&intent.description)
        .bind(&intent.correlation_id)
        .bind(&intent.confirmation_url)
        .bind(&intent.provider_payload)
        .bind(intent.settled_at.map(|t| *t.as_datetime()))
        .bind(intent.created_at.as_datetime())
        .bind(intent.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                "Failed to save payment",
                &["payments_provider_correlation_key"],
                "Provider payment id is already recorded",
            )
        })?;

        Ok(())
    }

    async fn update_checkout(&self, intent: &PaymentIntent) -> Result<(), DomainError> {
        let (_, _, _, subscription_id) = target_columns(&intent.target);

        let result = sqlx::query(
            r#"
            UPDATE payments SET
                correlation_id = $2,
                confirmation_url = $3,
                provider_payload = COALESCE($4, provider_payload),
                description = $5,
                subscription_id = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(intent.id.as_uuid())
        .bind(&intent.correlation_id)
        .bind(&intent.confirmation_url)
        .bind(&intent.provider_payload)
        .bind(&intent.description)
        .bind(subscription_id)
        .bind(intent.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                "Failed to update payment checkout",
                &["payments_provider_correlation_key"],
                "Provider payment id is already recorded",
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(payment_not_found(&intent.id));
        }
        Ok(())
    }

    async fn update_status(
        &self,
        intent: &PaymentIntent,
        expected: PaymentStatus,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payments SET
                status = $2,
                provider_payload = COALESCE($3, provider_payload),
                updated_at = $4
            WHERE id = $1 AND status = $5
            "#,
        )
        .bind(intent.id.as_uuid())
        .bind(intent.status.as_str())
        .bind(&intent.provider_payload)
        .bind(intent.updated_at.as_datetime())
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update payment status"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn mark_settled(&self, id: &PaymentId, at: Timestamp) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE payments SET settled_at = $2, updated_at = $2 WHERE id = $1 AND settled_at IS NULL",
        )
        .bind(id.as_uuid())
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to mark payment settled"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<PaymentIntent>, DomainError> {
        let sql = format!("SELECT {} FROM payments WHERE id = $1", PAYMENT_COLUMNS);
        let row: Option<PaymentRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch payment"))?;
        row.map(PaymentIntent::try_from).transpose()
    }

    async fn find_by_correlation_id(
        &self,
        provider: Provider,
        correlation_id: &str,
    ) -> Result<Option<PaymentIntent>, DomainError> {
        let sql = format!(
            "SELECT {} FROM payments WHERE provider = $1 AND correlation_id = $2",
            PAYMENT_COLUMNS
        );
        let row: Option<PaymentRow> = sqlx::query_as(&sql)
            .bind(provider.as_str())
            .bind(correlation_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch payment by correlation id"))?;
        row.map(PaymentIntent::try_from).transpose()
    }

    async fn list_by_payer(
        &self,
        payer_id: &UserId,
        limit: u32,
    ) -> Result<Vec<PaymentIntent>, DomainError> {
        let sql = format!(
            "SELECT {} FROM payments WHERE payer_id = $1 ORDER BY created_at DESC LIMIT $2",
            PAYMENT_COLUMNS
        );
        let rows: Vec<PaymentRow> = sqlx::query_as(&sql)
            .bind(payer_id.as_uuid())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list payments"))?;
        rows.into_iter().map(PaymentIntent::try_from).collect()
    }
}
