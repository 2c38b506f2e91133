//! PostgreSQL implementation of IdentityStore.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::{IdentityStore, UserRecord};

use super::db_error;

pub struct PostgresIdentityStore {
    pool: PgPool,
}

impl PostgresIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    display_name: String,
    username: Option<String>,
}

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    async fn resolve(&self, user_id: &UserId) -> Result<Option<UserRecord>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, display_name, username FROM users WHERE id = $1")
                .bind(user_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to resolve user"))?;

        Ok(row.map(|r| UserRecord {
            id: UserId::from_uuid(r.id),
            display_name: r.display_name,
            username: r.username,
        }))
    }
}
