//! In-memory ShareRepository.

use async_trait::async_trait;

use crate::domain::foundation::{ContactId, DomainError, ErrorCode, ShareId, UserId};
use crate::domain::sharing::{AccessToken, Share};
use crate::ports::ShareRepository;

use super::{conflict, page, MemoryDatabase};

pub struct InMemoryShareRepository {
    db: MemoryDatabase,
}

impl InMemoryShareRepository {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ShareRepository for InMemoryShareRepository {
    async fn save(&self, share: &Share) -> Result<(), DomainError> {
        let mut tables = self.db.lock()?;
        let clash = tables.shares.values().any(|s| {
            s.access_token == share.access_token
                || (s.is_active
                    && share.is_active
                    && s.owner_id == share.owner_id
                    && s.contact_id == share.contact_id)
        });
        if clash {
            return Err(conflict("An active share already exists for this contact"));
        }
        tables.shares.insert(share.id, share.clone());
        Ok(())
    }

    async fn update(&self, share: &Share) -> Result<(), DomainError> {
        let mut tables = self.db.lock()?;
        let stored = tables
            .shares
            .get_mut(&share.id)
            .ok_or_else(|| DomainError::new(ErrorCode::ShareNotFound, "Share not found"))?;

        // Counters and token belong to storage.
        let (views, purchases, token) = (
            stored.view_count,
            stored.purchase_count,
            stored.access_token.clone(),
        );
        *stored = share.clone();
        stored.view_count = views;
        stored.purchase_count = purchases;
        stored.access_token = token;
        Ok(())
    }

    async fn find_by_id(&self, id: &ShareId) -> Result<Option<Share>, DomainError> {
        Ok(self.db.lock()?.shares.get(id).cloned())
    }

    async fn find_by_token(&self, token: &AccessToken) -> Result<Option<Share>, DomainError> {
        let tables = self.db.lock()?;
        Ok(tables
            .shares
            .values()
            .find(|s| &s.access_token == token)
            .cloned())
    }

    async fn find_active(
        &self,
        owner_id: &UserId,
        contact_id: &ContactId,
    ) -> Result<Option<Share>, DomainError> {
        let tables = self.db.lock()?;
        Ok(tables
            .shares
            .values()
            .find(|s| s.is_active && &s.owner_id == owner_id && &s.contact_id == contact_id)
            .cloned())
    }

    async fn list_public(&self, limit: u32, offset: u32) -> Result<Vec<Share>, DomainError> {
        let tables = self.db.lock()?;
        let mut listed: Vec<Share> = tables
            .shares
            .values()
            .filter(|s| s.is_active && s.visibility.is_listed())
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(&listed, limit, offset))
    }

    async fn list_by_owner(&self, owner_id: &UserId) -> Result<Vec<Share>, DomainError> {
        let tables = self.db.lock()?;
        let mut owned: Vec<Share> = tables
            .shares
            .values()
            .filter(|s| s.is_active && &s.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn increment_views(&self, id: &ShareId) -> Result<(), DomainError> {
        let mut tables = self.db.lock()?;
        if let Some(share) = tables.shares.get_mut(id) {
            share.view_count += 1;
        }
        Ok(())
    }
}
