//! In-memory CheckoutSessionRepository.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::purchase::{CheckoutSession, CheckoutTarget};
use crate::ports::CheckoutSessionRepository;

use super::MemoryDatabase;

pub struct InMemoryCheckoutSessionRepository {
    db: MemoryDatabase,
}

impl InMemoryCheckoutSessionRepository {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CheckoutSessionRepository for InMemoryCheckoutSessionRepository {
    async fn upsert(&self, session: &CheckoutSession) -> Result<(), DomainError> {
        let mut tables = self.db.lock()?;
        tables
            .checkout_sessions
            .insert((session.buyer_id, session.target.key()), session.clone());
        Ok(())
    }

    async fn find(
        &self,
        buyer_id: &UserId,
        target: &CheckoutTarget,
    ) -> Result<Option<CheckoutSession>, DomainError> {
        let tables = self.db.lock()?;
        Ok(tables
            .checkout_sessions
            .get(&(*buyer_id, target.key()))
            .cloned())
    }

    async fn delete(&self, buyer_id: &UserId, target: &CheckoutTarget) -> Result<(), DomainError> {
        let mut tables = self.db.lock()?;
        tables.checkout_sessions.remove(&(*buyer_id, target.key()));
        Ok(())
    }
}
