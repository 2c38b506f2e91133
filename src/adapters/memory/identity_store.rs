//! In-memory IdentityStore.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::{IdentityStore, UserRecord};

use super::MemoryDatabase;

pub struct InMemoryIdentityStore {
    db: MemoryDatabase,
}

impl InMemoryIdentityStore {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }

    pub fn insert(&self, user: UserRecord) -> Result<(), DomainError> {
        self.db.lock()?.users.insert(user.id, user);
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn resolve(&self, user_id: &UserId) -> Result<Option<UserRecord>, DomainError> {
        Ok(self.db.lock()?.users.get(user_id).cloned())
    }
}
