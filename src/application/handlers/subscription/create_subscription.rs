//! CreateSubscriptionHandler - starts a seller subscription.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{DomainError, ErrorCode, Money, Timestamp, UserId};
use crate::domain::payment::Provider;
use crate::domain::subscription::{Plan, Subscription};
use crate::ports::SubscriptionRepository;

/// Command to create a subscription.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionCommand {
    pub user_id: UserId,
    pub plan: Plan,
    pub provider: Provider,
    pub price: Money,
    pub billing_cycle_days: i64,
}

/// Result of subscription creation.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionResult {
    pub subscription: Subscription,
}

/// Handler for creating subscriptions. One subscription per user.
pub struct CreateSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl CreateSubscriptionHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        cmd: CreateSubscriptionCommand,
    ) -> Result<CreateSubscriptionResult, DomainError> {
        if self.repository.find_by_user(&cmd.user_id).await?.is_some() {
            return Err(DomainError::new(
                ErrorCode::ConcurrencyConflict,
                "User already has a subscription",
            )
            .with_detail("user_id", cmd.user_id.to_string()));
        }

        let subscription = Subscription::create(
            cmd.user_id,
            cmd.plan,
            cmd.provider,
            cmd.price,
            cmd.billing_cycle_days,
            Timestamp::now(),
        )?;
        self.repository.save(&subscription).await?;

        info!(
            subscription_id = %subscription.id,
            user_id = %subscription.user_id,
            plan = %subscription.plan,
            "Subscription created"
        );

        Ok(CreateSubscriptionResult { subscription })
    }
}
