//! PostgreSQL implementation of CheckoutSessionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    CheckoutSessionId, DomainError, ErrorCode, PaymentId, Timestamp, UserId,
};
use crate::domain::purchase::{CheckoutSession, CheckoutTarget};
use crate::ports::CheckoutSessionRepository;

use super::db_error;

pub struct PostgresCheckoutSessionRepository {
    pool: PgPool,
}

impl PostgresCheckoutSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    buyer_id: Uuid,
    target: String,
    payment_id: Uuid,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for CheckoutSession {
    type Error = DomainError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let target = CheckoutTarget::from_key(&row.target).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid checkout target: {}", e))
        })?;
        Ok(CheckoutSession {
            id: CheckoutSessionId::from_uuid(row.id),
            buyer_id: UserId::from_uuid(row.buyer_id),
            target,
            payment_id: PaymentId::from_uuid(row.payment_id),
            created_at: Timestamp::from_datetime(row.created_at),
            expires_at: Timestamp::from_datetime(row.expires_at),
        })
    }
}

#[async_trait]
impl CheckoutSessionRepository for PostgresCheckoutSessionRepository {
    async fn upsert(&self, session: &CheckoutSession) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO checkout_sessions (id, buyer_id, target, payment_id, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT ON CONSTRAINT checkout_sessions_buyer_target_key DO UPDATE SET
                id = EXCLUDED.id,
                payment_id = EXCLUDED.payment_id,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(session.id.as_uuid())
        .bind(session.buyer_id.as_uuid())
        .bind(session.target.key())
        .bind(session.payment_id.as_uuid())
        .bind(session.created_at.as_datetime())
        .bind(session.expires_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to save checkout session"))?;

        Ok(())
    }

    async fn find(
        &self,
        buyer_id: &UserId,
        target: &CheckoutTarget,
    ) -> Result<Option<CheckoutSession>, DomainError> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, buyer_id, target, payment_id, created_at, expires_at
            FROM checkout_sessions
            WHERE buyer_id = $1 AND target = $2
            "#,
        )
        .bind(buyer_id.as_uuid())
        .bind(target.key())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch checkout session"))?;
        row.map(CheckoutSession::try_from).transpose()
    }

    async fn delete(&self, buyer_id: &UserId, target: &CheckoutTarget) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM checkout_sessions WHERE buyer_id = $1 AND target = $2")
            .bind(buyer_id.as_uuid())
            .bind(target.key())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete checkout session"))?;
        Ok(())
    }
}
