//! Subscription bodies.

use serde::Serialize;

use crate::domain::payment::Provider;
use crate::domain::subscription::{Plan, Subscription, SubscriptionStatus};

use super::super::dto::{iso, MoneyDto};

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub subscription_id: String,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub provider: Provider,
    pub price: MoneyDto,
    pub billing_cycle_days: i64,
    pub current_period_start: String,
    pub current_period_end: String,
    pub next_payment_at: Option<String>,
    pub cancelled_at: Option<String>,
    /// Absent where the caller did not ask for the gate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_seller_access: Option<bool>,
}

impl SubscriptionResponse {
    pub fn new(subscription: &Subscription, has_seller_access: Option<bool>) -> Self {
        Self {
            subscription_id: subscription.id.to_string(),
            plan: subscription.plan,
            status: subscription.status,
            provider: subscription.provider,
            price: subscription.price.into(),
            billing_cycle_days: subscription.billing_cycle_days,
            current_period_start: iso(&subscription.current_period_start),
            current_period_end: iso(&subscription.current_period_end),
            next_payment_at: subscription.next_payment_at.as_ref().map(iso),
            cancelled_at: subscription.cancelled_at.as_ref().map(iso),
            has_seller_access,
        }
    }
}
