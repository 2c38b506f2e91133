//! RenewSubscriptionHandler - extends a subscription by one cycle from now.
//!
//! Only invoked when a subscription payment settles.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp};
use crate::domain::subscription::Subscription;
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone)]
pub struct RenewSubscriptionCommand {
    pub subscription_id: SubscriptionId,
}

#[derive(Debug, Clone)]
pub struct RenewSubscriptionResult {
    pub subscription: Subscription,
}

pub struct RenewSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl RenewSubscriptionHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        cmd: RenewSubscriptionCommand,
    ) -> Result<RenewSubscriptionResult, DomainError> {
        let mut subscription = self
            .repository
            .find_by_id(&cmd.subscription_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::SubscriptionNotFound, "Subscription not found")
                    .with_detail("subscription_id", cmd.subscription_id.to_string())
            })?;

        subscription.renew(Timestamp::now())?;
        self.repository.update(&subscription).await?;

        info!(
            subscription_id = %subscription.id,
            period_end = %subscription.current_period_end.as_datetime(),
            "Subscription renewed"
        );

        Ok(RenewSubscriptionResult { subscription })
    }
}
