//! CancelSubscriptionHandler - cancels without revoking the current period.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::subscription::Subscription;
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct CancelSubscriptionResult {
    pub subscription: Subscription,
}

pub struct CancelSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl CancelSubscriptionHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        cmd: CancelSubscriptionCommand,
    ) -> Result<CancelSubscriptionResult, DomainError> {
        let mut subscription = self
            .repository
            .find_by_user(&cmd.user_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::SubscriptionNotFound, "No subscription to cancel")
            })?;

        subscription.cancel(Timestamp::now())?;
        self.repository.update(&subscription).await?;

        info!(
            subscription_id = %subscription.id,
            access_until = %subscription.current_period_end.as_datetime(),
            "Subscription cancelled"
        );

        Ok(CancelSubscriptionResult { subscription })
    }
}
