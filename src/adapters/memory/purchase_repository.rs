//! In-memory PurchaseRepository.
//!
//! `record` writes the contact copy, the purchase row and the share counter
//! under one table lock, mirroring the Postgres transaction.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ShareId, UserId};
use crate::domain::purchase::Purchase;
use crate::domain::sharing::ContactSnapshot;
use crate::ports::PurchaseRepository;

use super::contact_store::copy_record;
use super::{conflict, MemoryDatabase};

pub struct InMemoryPurchaseRepository {
    db: MemoryDatabase,
}

impl InMemoryPurchaseRepository {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PurchaseRepository for InMemoryPurchaseRepository {
    async fn record(
        &self,
        purchase: &Purchase,
        snapshot: &ContactSnapshot,
    ) -> Result<(), DomainError> {
        let mut tables = self.db.lock()?;

        let duplicate = tables
            .purchases
            .values()
            .any(|p| p.buyer_id == purchase.buyer_id && p.share_id == purchase.share_id);
        if duplicate {
            return Err(conflict("Buyer already owns this share"));
        }

        tables.contacts.insert(
            purchase.copied_contact_id,
            copy_record(purchase.copied_contact_id, purchase.buyer_id, snapshot),
        );
        tables.purchases.insert(purchase.id, purchase.clone());
        if let Some(share) = tables.shares.get_mut(&purchase.share_id) {
            share.purchase_count += 1;
        }
        Ok(())
    }

    async fn find_by_buyer_and_share(
        &self,
        buyer_id: &UserId,
        share_id: &ShareId,
    ) -> Result<Option<Purchase>, DomainError> {
        let tables = self.db.lock()?;
        Ok(tables
            .purchases
            .values()
            .find(|p| &p.buyer_id == buyer_id && &p.share_id == share_id)
            .cloned())
    }

    async fn list_by_buyer(
        &self,
        buyer_id: &UserId,
        limit: u32,
    ) -> Result<Vec<Purchase>, DomainError> {
        let tables = self.db.lock()?;
        let mut purchases: Vec<Purchase> = tables
            .purchases
            .values()
            .filter(|p| &p.buyer_id == buyer_id)
            .cloned()
            .collect();
        purchases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        purchases.truncate(limit as usize);
        Ok(purchases)
    }
}
