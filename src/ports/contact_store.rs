//! Contact store port.
//!
//! The marketplace never edits contacts. Buyer copies are written by
//! `PurchaseRepository::record` in the same transaction as the purchase.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ContactId, DomainError, UserId};
use crate::domain::sharing::ContactFields;

/// A contact as seen through the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: ContactId,
    pub owner_id: UserId,
    pub fields: ContactFields,
}

/// Narrow read interface into the contact store.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn get(&self, id: &ContactId) -> Result<Option<ContactRecord>, DomainError>;
}
