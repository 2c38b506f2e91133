//! Expiry maintenance: reminder listing and lapse marking.
//!
//! Both are meant to run from a periodic job.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp};
use crate::domain::subscription::{Subscription, SubscriptionStatus};
use crate::ports::SubscriptionRepository;

/// Days ahead the reminder window covers.
pub const EXPIRY_REMINDER_DAYS: i64 = 3;

/// Active subscriptions whose period ends within the window.
#[derive(Debug, Clone)]
pub struct ListExpiringQuery {
    pub within_days: i64,
}

impl Default for ListExpiringQuery {
    fn default() -> Self {
        Self {
            within_days: EXPIRY_REMINDER_DAYS,
        }
    }
}

pub struct ListExpiringHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl ListExpiringHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: ListExpiringQuery) -> Result<Vec<Subscription>, DomainError> {
        let now = Timestamp::now();
        self.repository
            .list_expiring(now, now.add_days(query.within_days))
            .await
    }
}

/// Marks lapsed subscriptions Expired once the grace window is over.
///
/// With `subscription_id` set only that subscription is expired, whatever
/// its period end; the sweeper decides when.
#[derive(Debug, Clone)]
pub struct MarkExpiredCommand {
    pub subscription_id: Option<SubscriptionId>,
    pub grace_days: i64,
}

#[derive(Debug, Clone, Default)]
pub struct MarkExpiredResult {
    pub expired: usize,
}

pub struct MarkExpiredHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl MarkExpiredHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    /// Scans periods that ended before `now - grace` and expires the ones
    /// still Active, PastDue or Cancelled. One failure does not stop the batch.
    pub async fn handle(&self, cmd: MarkExpiredCommand) -> Result<MarkExpiredResult, DomainError> {
        let now = Timestamp::now();
        if let Some(id) = cmd.subscription_id {
            return self.expire_one(&id, now).await;
        }

        let cutoff = now.add_days(-cmd.grace_days.max(0));
        let candidates = self.repository.list_lapsed(cutoff).await?;

        let mut result = MarkExpiredResult::default();
        for mut subscription in candidates {
            if let Err(e) = subscription.mark_expired(now) {
                warn!(subscription_id = %subscription.id, error = %e, "Cannot expire subscription");
                continue;
            }
            match self.repository.update(&subscription).await {
                Ok(()) => result.expired += 1,
                Err(e) => warn!(subscription_id = %subscription.id, error = %e, "Failed to persist expiry"),
            }
        }

        if result.expired > 0 {
            info!(count = result.expired, "Subscriptions expired");
        }
        Ok(result)
    }

    /// Expiring an already expired subscription is a no-op.
    async fn expire_one(
        &self,
        id: &SubscriptionId,
        now: Timestamp,
    ) -> Result<MarkExpiredResult, DomainError> {
        let mut subscription = self.repository.find_by_id(id).await?.ok_or_else(|| {
            DomainError::new(ErrorCode::SubscriptionNotFound, "Subscription not found")
                .with_detail("subscription_id", id.to_string())
        })?;
        if subscription.status == SubscriptionStatus::Expired {
            return Ok(MarkExpiredResult::default());
        }

        subscription.mark_expired(now)?;
        self.repository.update(&subscription).await?;
        info!(subscription_id = %subscription.id, "Subscription expired");
        Ok(MarkExpiredResult { expired: 1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemorySubscriptionRepository, MemoryDatabase};
    use crate::domain::foundation::{Currency, Money, UserId};
    use crate::domain::payment::Provider;
    use crate::domain::subscription::Plan;

    fn subscription_started(days_ago: i64) -> Subscription {
        Subscription::create(
            UserId::new(),
            Plan::Seller,
            Provider::YooKassa,
            Money::from_minor(99_000, Currency::Rub).unwrap(),
            30,
            Timestamp::now().add_days(-days_ago),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn lists_only_subscriptions_ending_within_window() {
        let repo = Arc::new(InMemorySubscriptionRepository::new(MemoryDatabase::new()));
        let ending_soon = subscription_started(28);
        let fresh = subscription_started(1);
        repo.save(&ending_soon).await.unwrap();
        repo.save(&fresh).await.unwrap();

        let handler = ListExpiringHandler::new(repo);
        let found = handler.handle(ListExpiringQuery::default()).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, ending_soon.id);
    }

    #[tokio::test]
    async fn expires_lapsed_subscriptions_after_grace() {
        let repo = Arc::new(InMemorySubscriptionRepository::new(MemoryDatabase::new()));
        let lapsed = subscription_started(40);
        let in_grace = subscription_started(31);
        repo.save(&lapsed).await.unwrap();
        repo.save(&in_grace).await.unwrap();

        let handler = MarkExpiredHandler::new(repo.clone());
        let result = handler
            .handle(MarkExpiredCommand { subscription_id: None, grace_days: 3 })
            .await
            .unwrap();

        assert_eq!(result.expired, 1);
        let stored = repo.find_by_id(&lapsed.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Expired);
        let untouched = repo.find_by_id(&in_grace.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn expires_a_single_subscription_on_request() {
        let repo = Arc::new(InMemorySubscriptionRepository::new(MemoryDatabase::new()));
        let target = subscription_started(31);
        let other = subscription_started(40);
        repo.save(&target).await.unwrap();
        repo.save(&other).await.unwrap();

        let handler = MarkExpiredHandler::new(repo.clone());
        let cmd = MarkExpiredCommand { subscription_id: Some(target.id), grace_days: 3 };
        assert_eq!(handler.handle(cmd.clone()).await.unwrap().expired, 1);
        assert_eq!(handler.handle(cmd).await.unwrap().expired, 0);

        let stored = repo.find_by_id(&target.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Expired);
        let untouched = repo.find_by_id(&other.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn unknown_subscription_is_not_found() {
        let repo = Arc::new(InMemorySubscriptionRepository::new(MemoryDatabase::new()));
        let err = MarkExpiredHandler::new(repo)
            .handle(MarkExpiredCommand { subscription_id: Some(SubscriptionId::new()), grace_days: 3 })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SubscriptionNotFound);
    }
}
