//! PaymentIntent aggregate - one attempt to collect money.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{
    Money, PaymentId, StateMachine, SubscriptionId, Timestamp, TransitionOutcome, UserId,
};

use super::{PaymentPurpose, PaymentStatus, PaymentTarget, Provider};

/// One attempt to pay, through one provider, for one purpose.
///
/// # Invariants
///
/// - status only changes along the [`PaymentStatus`] transition table
/// - `settled_at` is set once, after the downstream effect was applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: PaymentId,
    pub payer_id: UserId,
    pub target: PaymentTarget,
    pub provider: Provider,
    pub status: PaymentStatus,
    pub amount: Money,
    pub description: Option<String>,

    /// Provider's payment identifier; empty until checkout is created.
    pub correlation_id: Option<String>,

    /// Provider-hosted page where the payer completes payment.
    pub confirmation_url: Option<String>,

    /// Last raw provider object, kept for audit.
    pub provider_payload: Option<Value>,

    /// When the downstream effect (purchase or renewal) was applied.
    pub settled_at: Option<Timestamp>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PaymentIntent {
    /// Opens a new pending intent.
    pub fn open(
        payer_id: UserId,
        target: PaymentTarget,
        provider: Provider,
        amount: Money,
        description: Option<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: PaymentId::new(),
            payer_id,
            target,
            provider,
            status: PaymentStatus::Pending,
            amount,
            description,
            correlation_id: None,
            confirmation_url: None,
            provider_payload: None,
            settled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn purpose(&self) -> PaymentPurpose {
        self.target.purpose()
    }

    /// Records what the provider returned when checkout was created.
    pub fn attach_checkout(
        &mut self,
        correlation_id: String,
        confirmation_url: Option<String>,
        payload: Option<Value>,
    ) {
        self.correlation_id = Some(correlation_id);
        self.confirmation_url = confirmation_url;
        if payload.is_some() {
            self.provider_payload = payload;
        }
        self.updated_at = Timestamp::now();
    }

    /// Applies a status update through the transition table.
    ///
    /// The payload is stored only when the status actually moves, so a
    /// late duplicate cannot overwrite the audit record of the real change.
    pub fn apply_status(
        &mut self,
        target: PaymentStatus,
        payload: Option<Value>,
    ) -> TransitionOutcome<PaymentStatus> {
        let outcome = self.status.apply(target);
        if let TransitionOutcome::Moved(next) = outcome {
            self.status = next;
            if payload.is_some() {
                self.provider_payload = payload;
            }
            self.updated_at = Timestamp::now();
        }
        outcome
    }

    /// True when the payment succeeded but its effect was not yet applied.
    pub fn needs_settlement(&self) -> bool {
        self.status == PaymentStatus::Succeeded && self.settled_at.is_none()
    }

    pub fn mark_settled(&mut self, at: Timestamp) {
        if self.settled_at.is_none() {
            self.settled_at = Some(at);
            self.updated_at = at;
        }
    }

    /// Points a subscription payment at the subscription it created.
    pub fn link_subscription(&mut self, subscription_id: SubscriptionId) {
        if let PaymentTarget::Subscription { plan, .. } = self.target {
            self.target = PaymentTarget::Subscription {
                plan,
                subscription_id: Some(subscription_id),
            };
            self.updated_at = Timestamp::now();
        }
    }
}
