//! GetSubscriptionHandler - the caller's subscription with its access state.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::subscription::{Subscription, DEFAULT_GRACE_DAYS};
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone)]
pub struct GetSubscriptionQuery {
    pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct SubscriptionView {
    pub subscription: Subscription,
    pub has_seller_access: bool,
}

pub struct GetSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    grace_days: i64,
}

impl GetSubscriptionHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self::with_grace_days(repository, DEFAULT_GRACE_DAYS)
    }

    pub fn with_grace_days(repository: Arc<dyn SubscriptionRepository>, grace_days: i64) -> Self {
        Self {
            repository,
            grace_days,
        }
    }

    pub async fn handle(&self, query: GetSubscriptionQuery) -> Result<SubscriptionView, DomainError> {
        let subscription = self
            .repository
            .find_by_user(&query.user_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::SubscriptionNotFound, "No subscription")
                    .with_detail("user_id", query.user_id.to_string())
            })?;

        let has_seller_access = subscription.has_seller_access(Timestamp::now(), self.grace_days);
        Ok(SubscriptionView {
            subscription,
            has_seller_access,
        })
    }
}
