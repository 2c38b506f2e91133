//! CheckSellerAccessHandler - the subscription gate for paid listings.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::subscription::DEFAULT_GRACE_DAYS;
use crate::ports::SubscriptionRepository;

/// Query whether a user may publish shares that charge for a copy.
#[derive(Debug, Clone)]
pub struct CheckSellerAccessQuery {
    pub user_id: UserId,
    /// Evaluation instant; defaults to now.
    pub at: Option<Timestamp>,
}

impl CheckSellerAccessQuery {
    pub fn now(user_id: UserId) -> Self {
        Self { user_id, at: None }
    }
}

/// Answers seller-access questions with a configured grace period.
pub struct CheckSellerAccessHandler {
    repository: Arc<dyn SubscriptionRepository>,
    grace_days: i64,
}

impl CheckSellerAccessHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self::with_grace_days(repository, DEFAULT_GRACE_DAYS)
    }

    pub fn with_grace_days(repository: Arc<dyn SubscriptionRepository>, grace_days: i64) -> Self {
        Self {
            repository,
            grace_days,
        }
    }

    /// No subscription means no access; storage failures propagate.
    pub async fn handle(&self, query: CheckSellerAccessQuery) -> Result<bool, DomainError> {
        let at = query.at.unwrap_or_else(Timestamp::now);
        let subscription = self.repository.find_by_user(&query.user_id).await?;
        Ok(subscription
            .map(|s| s.has_seller_access(at, self.grace_days))
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemorySubscriptionRepository, MemoryDatabase};
    use crate::domain::foundation::{Currency, Money};
    use crate::domain::payment::Provider;
    use crate::domain::subscription::{Plan, Subscription};

    async fn setup(plan: Plan, started_days_ago: i64) -> (CheckSellerAccessHandler, UserId, Subscription) {
        let repo = Arc::new(InMemorySubscriptionRepository::new(MemoryDatabase::new()));
        let user = UserId::new();
        let sub = Subscription::create(
            user,
            plan,
            Provider::YooKassa,
            Money::from_minor(99_000, Currency::Rub).unwrap(),
            30,
            Timestamp::now().add_days(-started_days_ago),
        )
        .unwrap();
        repo.save(&sub).await.unwrap();
        (CheckSellerAccessHandler::new(repo), user, sub)
    }

    #[tokio::test]
    async fn user_without_subscription_has_no_access() {
        let repo = Arc::new(InMemorySubscriptionRepository::new(MemoryDatabase::new()));
        let handler = CheckSellerAccessHandler::new(repo);
        assert!(!handler.handle(CheckSellerAccessQuery::now(UserId::new())).await.unwrap());
    }

    #[tokio::test]
    async fn active_seller_has_access() {
        let (handler, user, _) = setup(Plan::Seller, 1).await;
        assert!(handler.handle(CheckSellerAccessQuery::now(user)).await.unwrap());
    }

    #[tokio::test]
    async fn free_plan_never_grants_access() {
        let (handler, user, _) = setup(Plan::Free, 1).await;
        assert!(!handler.handle(CheckSellerAccessQuery::now(user)).await.unwrap());
    }

    #[tokio::test]
    async fn access_holds_through_grace_and_ends_after() {
        let (handler, user, sub) = setup(Plan::SellerPro, 40).await;
        let end = sub.current_period_end;

        let inside = CheckSellerAccessQuery { user_id: user, at: Some(end.add_days(2)) };
        assert!(handler.handle(inside).await.unwrap());

        let at_boundary = CheckSellerAccessQuery {
            user_id: user,
            at: Some(end.add_days(DEFAULT_GRACE_DAYS)),
        };
        assert!(!handler.handle(at_boundary).await.unwrap());
    }
}
