//! In-memory SubscriptionRepository.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{Subscription, SubscriptionStatus};
use crate::ports::SubscriptionRepository;

use super::{conflict, MemoryDatabase};

pub struct InMemorySubscriptionRepository {
    db: MemoryDatabase,
}

impl InMemorySubscriptionRepository {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut tables = self.db.lock()?;
        if tables
            .subscriptions
            .values()
            .any(|s| s.user_id == subscription.user_id)
        {
            return Err(conflict("User already has a subscription"));
        }
        tables.subscriptions.insert(subscription.id, subscription.clone());
        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut tables = self.db.lock()?;
        match tables.subscriptions.get_mut(&subscription.id) {
            Some(stored) => {
                *stored = subscription.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                "Subscription not found",
            )),
        }
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        Ok(self.db.lock()?.subscriptions.get(id).cloned())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Subscription>, DomainError> {
        let tables = self.db.lock()?;
        Ok(tables
            .subscriptions
            .values()
            .find(|s| &s.user_id == user_id)
            .cloned())
    }

    async fn list_expiring(
        &self,
        from: Timestamp,
        until: Timestamp,
    ) -> Result<Vec<Subscription>, DomainError> {
        let tables = self.db.lock()?;
        let mut expiring: Vec<Subscription> = tables
            .subscriptions
            .values()
            .filter(|s| {
                s.status == SubscriptionStatus::Active
                    && !s.current_period_end.is_before(&from)
                    && s.current_period_end.is_before(&until)
            })
            .cloned()
            .collect();
        expiring.sort_by(|a, b| a.current_period_end.cmp(&b.current_period_end));
        Ok(expiring)
    }

    async fn list_lapsed(&self, cutoff: Timestamp) -> Result<Vec<Subscription>, DomainError> {
        let tables = self.db.lock()?;
        Ok(tables
            .subscriptions
            .values()
            .filter(|s| {
                s.status != SubscriptionStatus::Expired && s.current_period_end.is_before(&cutoff)
            })
            .cloned()
            .collect())
    }
}
