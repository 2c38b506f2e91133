//! PostgreSQL implementation of ContactStore.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{ContactId, DomainError, ErrorCode, UserId};
use crate::domain::sharing::ContactFields;
use crate::ports::{ContactRecord, ContactStore};

use super::db_error;

pub struct PostgresContactStore {
    pool: PgPool,
}

impl PostgresContactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContactRow {
    id: Uuid,
    owner_id: Uuid,
    fields: Value,
}

impl TryFrom<ContactRow> for ContactRecord {
    type Error = DomainError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        let fields: ContactFields = serde_json::from_value(row.fields).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid contact fields: {}", e))
        })?;
        Ok(ContactRecord {
            id: ContactId::from_uuid(row.id),
            owner_id: UserId::from_uuid(row.owner_id),
            fields,
        })
    }
}

#[async_trait]
impl ContactStore for PostgresContactStore {
    async fn get(&self, id: &ContactId) -> Result<Option<ContactRecord>, DomainError> {
        let row: Option<ContactRow> =
            sqlx::query_as("SELECT id, owner_id, fields FROM contacts WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to fetch contact"))?;
        row.map(ContactRecord::try_from).transpose()
    }
}
