//! PostgreSQL implementation of ShareRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    ContactId, DomainError, ErrorCode, ShareId, Timestamp, UserId,
};
use crate::domain::sharing::{parse_field_set, AccessToken, FieldSet, Share, Visibility};
use crate::ports::ShareRepository;

use super::{db_error, map_write_error, money_from_row, parse_column};

const SHARE_COLUMNS: &str = r#"
    id, contact_id, owner_id, visibility, allowed_viewers, visible_fields, hidden_fields,
    price_minor, currency, description, access_token, is_active, view_count, purchase_count,
    created_at, updated_at
"#;

pub struct PostgresShareRepository {
    pool: PgPool,
}

impl PostgresShareRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ShareRow {
    id: Uuid,
    contact_id: Uuid,
    owner_id: Uuid,
    visibility: String,
    allowed_viewers: Vec<Uuid>,
    visible_fields: Vec<String>,
    hidden_fields: Vec<String>,
    price_minor: i64,
    currency: String,
    description: Option<String>,
    access_token: String,
    is_active: bool,
    view_count: i64,
    purchase_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ShareRow> for Share {
    type Error = DomainError;

    fn try_from(row: ShareRow) -> Result<Self, Self::Error> {
        let visibility: Visibility = parse_column("visibility", &row.visibility)?;
        let fields = |names: &[String]| -> Result<FieldSet, DomainError> {
            parse_field_set(names).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid stored field: {}", e))
            })
        };
        let access_token = AccessToken::parse(row.access_token).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid stored token: {}", e))
        })?;

        Ok(Share {
            id: ShareId::from_uuid(row.id),
            contact_id: ContactId::from_uuid(row.contact_id),
            owner_id: UserId::from_uuid(row.owner_id),
            visibility,
            allowed_viewers: row.allowed_viewers.into_iter().map(UserId::from_uuid).collect(),
            visible_fields: fields(&row.visible_fields)?,
            hidden_fields: fields(&row.hidden_fields)?,
            price: money_from_row(row.price_minor, &row.currency)?,
            description: row.description,
            access_token,
            is_active: row.is_active,
            view_count: row.view_count,
            purchase_count: row.purchase_count,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn field_names(fields: &FieldSet) -> Vec<String> {
    fields.iter().map(|f| f.as_str().to_string()).collect()
}

fn viewer_ids(share: &Share) -> Vec<Uuid> {
    share.allowed_viewers.iter().map(|u| *u.as_uuid()).collect()
}

impl PostgresShareRepository {
    async fn fetch_one(&self, filter: &str, bind: Uuid) -> Result<Option<Share>, DomainError> {
        let sql = format!("SELECT {} FROM contact_shares WHERE {}", SHARE_COLUMNS, filter);
        let row: Option<ShareRow> = sqlx::query_as(&sql)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch share"))?;
        row.map(Share::try_from).transpose()
    }
}

#[async_trait]
impl ShareRepository for PostgresShareRepository {
    async fn save(&self, share: &Share) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO contact_shares (
                id, contact_id, owner_id, visibility, allowed_viewers, visible_fields,
                hidden_fields, price_minor, currency, description, access_token, is_active,
                view_count, purchase_count, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 0, 0, $13, $14)
            "#,
        )
        .bind(share.id.as_uuid())
        .bind(share.contact_id.as_uuid())
        .bind(share.owner_id.as_uuid())
        .bind(share.visibility.as_str())
        .bind(viewer_ids(share))
        .bind(field_names(&share.visible_fields))
        .bind(field_names(&share.hidden_fields))
        .bind(share.price.minor)
        .bind(share.price.currency.code())
        .bind(&share.description)
        .bind(share.access_token.as_str())
        .bind(share.is_active)
        .bind(share.created_at.as_datetime())
        .bind(share.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                "Failed to save share",
                &["contact_shares_active_contact_owner_key", "contact_shares_access_token_key"],
                "An active share already exists for this contact",
            )
        })?;

        Ok(())
    }

    async fn update(&self, share: &Share) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE contact_shares SET
                visibility = $2,
                allowed_viewers = $3,
                visible_fields = $4,
                hidden_fields = $5,
                price_minor = $6,
                currency = $7,
                description = $8,
                is_active = $9,
                updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(share.id.as_uuid())
        .bind(share.visibility.as_str())
        .bind(viewer_ids(share))
        .bind(field_names(&share.visible_fields))
        .bind(field_names(&share.hidden_fields))
        .bind(share.price.minor)
        .bind(share.price.currency.code())
        .bind(&share.description)
        .bind(share.is_active)
        .bind(share.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                "Failed to update share",
                &["contact_shares_active_contact_owner_key"],
                "An active share already exists for this contact",
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::ShareNotFound, "Share not found")
                .with_detail("share_id", share.id.to_string()));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &ShareId) -> Result<Option<Share>, DomainError> {
        self.fetch_one("id = $1", *id.as_uuid()).await
    }

    async fn find_by_token(&self, token: &AccessToken) -> Result<Option<Share>, DomainError> {
        let sql = format!("SELECT {} FROM contact_shares WHERE access_token = $1", SHARE_COLUMNS);
        let row: Option<ShareRow> = sqlx::query_as(&sql)
            .bind(token.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch share by token"))?;
        row.map(Share::try_from).transpose()
    }

    async fn find_active(
        &self,
        owner_id: &UserId,
        contact_id: &ContactId,
    ) -> Result<Option<Share>, DomainError> {
        let sql = format!(
            "SELECT {} FROM contact_shares WHERE owner_id = $1 AND contact_id = $2 AND is_active",
            SHARE_COLUMNS
        );
        let row: Option<ShareRow> = sqlx::query_as(&sql)
            .bind(owner_id.as_uuid())
            .bind(contact_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch active share"))?;
        row.map(Share::try_from).transpose()
    }

    async fn list_public(&self, limit: u32, offset: u32) -> Result<Vec<Share>, DomainError> {
        let sql = format!(
            r#"
            SELECT {} FROM contact_shares
            WHERE is_active AND visibility IN ('open', 'paid')
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
            SHARE_COLUMNS
        );
        let rows: Vec<ShareRow> = sqlx::query_as(&sql)
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list public shares"))?;
        rows.into_iter().map(Share::try_from).collect()
    }

    async fn list_by_owner(&self, owner_id: &UserId) -> Result<Vec<Share>, DomainError> {
        let sql = format!(
            "SELECT {} FROM contact_shares WHERE owner_id = $1 AND is_active ORDER BY created_at DESC",
            SHARE_COLUMNS
        );
        let rows: Vec<ShareRow> = sqlx::query_as(&sql)
            .bind(owner_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list user shares"))?;
        rows.into_iter().map(Share::try_from).collect()
    }

    async fn increment_views(&self, id: &ShareId) -> Result<(), DomainError> {
        sqlx::query("UPDATE contact_shares SET view_count = view_count + 1 WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to count share view"))?;
        Ok(())
    }
}
