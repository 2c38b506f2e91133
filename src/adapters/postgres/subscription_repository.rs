//! PostgreSQL implementation of SubscriptionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp, UserId};
use crate::domain::payment::Provider;
use crate::domain::subscription::{Plan, Subscription, SubscriptionStatus};
use crate::ports::SubscriptionRepository;

use super::{db_error, map_write_error, money_from_row, parse_column};

const SUBSCRIPTION_COLUMNS: &str = r#"
    id, user_id, plan, status, provider, price_minor, currency, billing_cycle_days,
    current_period_start, current_period_end, next_payment_at, cancelled_at, created_at,
    updated_at
"#;

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_many(
        &self,
        sql: &str,
        binds: &[DateTime<Utc>],
    ) -> Result<Vec<Subscription>, DomainError> {
        let mut query = sqlx::query_as::<_, SubscriptionRow>(sql);
        for value in binds {
            query = query.bind(*value);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list subscriptions"))?;
        rows.into_iter().map(Subscription::try_from).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    plan: String,
    status: String,
    provider: String,
    price_minor: i64,
    currency: String,
    billing_cycle_days: i32,
    current_period_start: DateTime<Utc>,
    current_period_end: DateTime<Utc>,
    next_payment_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            plan: parse_column::<Plan>("plan", &row.plan)?,
            status: parse_column::<SubscriptionStatus>("status", &row.status)?,
            provider: parse_column::<Provider>("provider", &row.provider)?,
            price: money_from_row(row.price_minor, &row.currency)?,
            billing_cycle_days: i64::from(row.billing_cycle_days),
            current_period_start: Timestamp::from_datetime(row.current_period_start),
            current_period_end: Timestamp::from_datetime(row.current_period_end),
            next_payment_at: row.next_payment_at.map(Timestamp::from_datetime),
            cancelled_at: row.cancelled_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn cycle_days(subscription: &Subscription) -> Result<i32, DomainError> {
    i32::try_from(subscription.billing_cycle_days).map_err(|_| {
        DomainError::validation("billing_cycle_days", "Billing cycle is out of range")
    })
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, user_id, plan, status, provider, price_minor, currency, billing_cycle_days,
                current_period_start, current_period_end, next_payment_at, cancelled_at,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.user_id.as_uuid())
        .bind(subscription.plan.as_str())
        .bind(subscription.status.as_str())
        .bind(subscription.provider.as_str())
        .bind(subscription.price.minor)
        .bind(subscription.price.currency.code())
        .bind(cycle_days(subscription)?)
        .bind(subscription.current_period_start.as_datetime())
        .bind(subscription.current_period_end.as_datetime())
        .bind(subscription.next_payment_at.map(|t| *t.as_datetime()))
        .bind(subscription.cancelled_at.map(|t| *t.as_datetime()))
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                "Failed to save subscription",
                &["subscriptions_user_id_key"],
                "User already has a subscription",
            )
        })?;

        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                plan = $2,
                status = $3,
                price_minor = $4,
                currency = $5,
                billing_cycle_days = $6,
                current_period_start = $7,
                current_period_end = $8,
                next_payment_at = $9,
                cancelled_at = $10,
                updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.plan.as_str())
        .bind(subscription.status.as_str())
        .bind(subscription.price.minor)
        .bind(subscription.price.currency.code())
        .bind(cycle_days(subscription)?)
        .bind(subscription.current_period_start.as_datetime())
        .bind(subscription.current_period_end.as_datetime())
        .bind(subscription.next_payment_at.map(|t| *t.as_datetime()))
        .bind(subscription.cancelled_at.map(|t| *t.as_datetime()))
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update subscription"))?;

        if result.rows_affected() == 0 {
            return Err(
                DomainError::new(ErrorCode::SubscriptionNotFound, "Subscription not found")
                    .with_detail("subscription_id", subscription.id.to_string()),
            );
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let sql = format!("SELECT {} FROM subscriptions WHERE id = $1", SUBSCRIPTION_COLUMNS);
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch subscription"))?;
        row.map(Subscription::try_from).transpose()
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Subscription>, DomainError> {
        let sql = format!("SELECT {} FROM subscriptions WHERE user_id = $1", SUBSCRIPTION_COLUMNS);
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch user subscription"))?;
        row.map(Subscription::try_from).transpose()
    }

    async fn list_expiring(
        &self,
        from: Timestamp,
        until: Timestamp,
    ) -> Result<Vec<Subscription>, DomainError> {
        let sql = format!(
            r#"
            SELECT {} FROM subscriptions
            WHERE status = 'active' AND current_period_end >= $1 AND current_period_end < $2
            ORDER BY current_period_end
            "#,
            SUBSCRIPTION_COLUMNS
        );
        self.fetch_many(&sql, &[*from.as_datetime(), *until.as_datetime()])
            .await
    }

    async fn list_lapsed(&self, cutoff: Timestamp) -> Result<Vec<Subscription>, DomainError> {
        let sql = format!(
            r#"
            SELECT {} FROM subscriptions
            WHERE status <> 'expired' AND current_period_end < $1
            ORDER BY current_period_end
            "#,
            SUBSCRIPTION_COLUMNS
        );
        self.fetch_many(&sql, &[*cutoff.as_datetime()]).await
    }
}
