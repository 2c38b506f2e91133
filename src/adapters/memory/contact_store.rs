//! In-memory ContactStore.

use async_trait::async_trait;

use crate::domain::foundation::{ContactId, DomainError, ErrorCode, UserId};
use crate::domain::sharing::{ContactFields, ContactSnapshot};
use crate::ports::{ContactRecord, ContactStore};

use super::MemoryDatabase;

/// Builds the buyer-owned record for a snapshot.
pub(crate) fn copy_record(
    id: ContactId,
    owner_id: UserId,
    snapshot: &ContactSnapshot,
) -> ContactRecord {
    ContactRecord {
        id,
        owner_id,
        fields: snapshot.stored_fields(),
    }
}

pub struct InMemoryContactStore {
    db: MemoryDatabase,
}

impl InMemoryContactStore {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }

    /// Seeds a contact owned by `owner_id`.
    pub fn insert(&self, owner_id: UserId, fields: ContactFields) -> Result<ContactId, DomainError> {
        let id = ContactId::new();
        self.db
            .lock()?
            .contacts
            .insert(id, ContactRecord { id, owner_id, fields });
        Ok(id)
    }

    /// Overwrites one field of an existing contact, as the contact CRUD
    /// layer would on an owner edit.
    pub fn set_field(
        &self,
        id: &ContactId,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), DomainError> {
        let mut tables = self.db.lock()?;
        let record = tables
            .contacts
            .get_mut(id)
            .ok_or_else(|| DomainError::new(ErrorCode::ContactNotFound, "Contact not found"))?;
        record.fields.insert(key.to_string(), value);
        Ok(())
    }

    /// Number of contacts owned by `owner_id`.
    pub fn count_owned_by(&self, owner_id: &UserId) -> Result<usize, DomainError> {
        let tables = self.db.lock()?;
        Ok(tables
            .contacts
            .values()
            .filter(|c| &c.owner_id == owner_id)
            .count())
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn get(&self, id: &ContactId) -> Result<Option<ContactRecord>, DomainError> {
        Ok(self.db.lock()?.contacts.get(id).cloned())
    }
}
