//! PaymentSettler - applies one provider event to the ledger and its effect.
//!
//! Shared by webhook delivery and the payer's status poll, so both paths
//! reconcile identically:
//!
//! 1. Look the intent up by correlation id; unknown ids are acknowledged
//! 2. Drive the idempotent status transition
//! 3. If the intent is Succeeded and unsettled, apply exactly one effect
//!    (purchase or subscription renewal), then stamp `settled_at`. Effects
//!    for the same intent run one at a time and re-check `settled_at` first
//!
//! An effect failure propagates so the provider redelivers; `settled_at`
//! stays empty and the next delivery completes it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use tracing::{debug, error, info, warn};

use crate::application::handlers::ledger::{
    PaymentLocator, TransitionPaymentCommand, TransitionPaymentHandler,
};
use crate::application::handlers::purchase::{PurchaseShareCommand, PurchaseShareHandler};
use crate::application::handlers::sharing::ShareLocator;
use crate::application::handlers::subscription::{
    CreateSubscriptionCommand, CreateSubscriptionHandler, RenewSubscriptionCommand,
    RenewSubscriptionHandler,
};
use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, SubscriptionId, Timestamp};
use crate::domain::payment::{PaymentIntent, PaymentStatus, PaymentTarget, Provider};
use crate::domain::subscription::{Plan, PlanTerms};
use crate::domain::webhook::ProviderEvent;
use crate::ports::{PaymentLedgerRepository, SubscriptionRepository};

/// What reconciling one event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Event kind carries no status change.
    Ignored { event: String },

    /// No intent has this correlation id.
    Unmatched { correlation_id: String },

    /// The event reached a known intent.
    Applied {
        payment_id: PaymentId,
        status: PaymentStatus,
        /// True when this call applied the downstream effect.
        settled: bool,
    },
}

pub struct PaymentSettler {
    ledger: Arc<dyn PaymentLedgerRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    transition: TransitionPaymentHandler,
    purchase: Arc<PurchaseShareHandler>,
    renew: RenewSubscriptionHandler,
    create: CreateSubscriptionHandler,
    terms: PlanTerms,
    /// Serializes effects per intent so concurrent deliveries cannot renew twice.
    settle_gates: IntentGates,
}

/// One async lock per intent being settled.
#[derive(Default)]
struct IntentGates {
    gates: std::sync::Mutex<HashMap<PaymentId, Arc<Mutex<()>>>>,
}

impl IntentGates {
    fn acquire(&self, id: &PaymentId) -> Result<Arc<Mutex<()>>, DomainError> {
        let mut gates = self.gates.lock().map_err(|_| {
            DomainError::new(ErrorCode::InternalError, "Settlement gate lock poisoned")
        })?;
        Ok(gates.entry(*id).or_default().clone())
    }

    /// Forgets the gate once no other delivery holds it.
    fn release(&self, id: &PaymentId, gate: Arc<Mutex<()>>) {
        if let Ok(mut gates) = self.gates.lock() {
            // One reference in the map, one here.
            if Arc::strong_count(&gate) == 2 {
                gates.remove(id);
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.gates.lock().map(|g| g.len()).unwrap_or(0)
    }
}

impl PaymentSettler {
    pub fn new(
        ledger: Arc<dyn PaymentLedgerRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        purchase: Arc<PurchaseShareHandler>,
        terms: PlanTerms,
    ) -> Self {
        Self {
            transition: TransitionPaymentHandler::new(ledger.clone()),
            renew: RenewSubscriptionHandler::new(subscriptions.clone()),
            create: CreateSubscriptionHandler::new(subscriptions.clone()),
            ledger,
            subscriptions,
            purchase,
            terms,
            settle_gates: IntentGates::default(),
        }
    }

    pub async fn apply(
        &self,
        provider: Provider,
        event: ProviderEvent,
    ) -> Result<ReconcileOutcome, DomainError> {
        let Some(status) = event.kind.target_status() else {
            debug!(provider = %provider, event = event.kind.name(), "Ignoring provider event");
            return Ok(ReconcileOutcome::Ignored {
                event: event.kind.name().to_string(),
            });
        };

        let Some(stored) = self
            .ledger
            .find_by_correlation_id(provider, &event.correlation_id)
            .await?
        else {
            warn!(
                provider = %provider,
                correlation_id = %event.correlation_id,
                event = event.kind.name(),
                "Webhook for unknown payment, acknowledging"
            );
            return Ok(ReconcileOutcome::Unmatched {
                correlation_id: event.correlation_id,
            });
        };

        let result = self
            .transition
            .handle(TransitionPaymentCommand {
                locator: PaymentLocator::Id(stored.id),
                status,
                payload: Some(event.payload),
            })
            .await?;

        let mut intent = result.intent;
        let mut settled = false;
        if intent.needs_settlement() {
            let id = intent.id;
            let gate = self.settle_gates.acquire(&id)?;
            let outcome = {
                let _held = gate.lock().await;
                self.settle_once(&mut intent).await
            };
            self.settle_gates.release(&id, gate);
            settled = outcome?;
        }

        Ok(ReconcileOutcome::Applied {
            payment_id: intent.id,
            status: intent.status,
            settled,
        })
    }

    /// Re-reads the intent under its gate, since a concurrent delivery may
    /// have settled it, and applies the effect if it is still due.
    async fn settle_once(&self, intent: &mut PaymentIntent) -> Result<bool, DomainError> {
        if let Some(fresh) = self.ledger.find_by_id(&intent.id).await? {
            *intent = fresh;
        }
        if !intent.needs_settlement() {
            return Ok(false);
        }
        self.settle(intent).await?;
        Ok(true)
    }

    async fn settle(&self, intent: &mut PaymentIntent) -> Result<(), DomainError> {
        match intent.target {
            PaymentTarget::Share { share_id } => {
                let outcome = self
                    .purchase
                    .handle(PurchaseShareCommand {
                        locator: ShareLocator::Id(share_id),
                        buyer_id: intent.payer_id,
                        payment_id: Some(intent.id),
                    })
                    .await;
                match outcome {
                    Ok(result) => {
                        debug!(
                            payment_id = %intent.id,
                            purchase_id = %result.purchase.id,
                            newly_created = result.newly_created,
                            "Purchase settled"
                        );
                    }
                    Err(e) if is_unfulfillable(&e) => {
                        // Redelivery cannot change the outcome; the payer needs a refund.
                        error!(
                            payment_id = %intent.id,
                            share_id = %share_id,
                            payer_id = %intent.payer_id,
                            error = %e,
                            "Paid share can no longer be delivered, refund required"
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
            PaymentTarget::Subscription {
                plan,
                subscription_id,
            } => {
                let id = self.settle_subscription(intent, plan, subscription_id).await?;
                intent.link_subscription(id);
                self.ledger.update_checkout(intent).await?;
            }
        }

        let now = Timestamp::now();
        if self.ledger.mark_settled(&intent.id, now).await? {
            intent.mark_settled(now);
            info!(payment_id = %intent.id, purpose = %intent.purpose(), "Payment settled");
        } else {
            debug!(payment_id = %intent.id, "Payment was settled concurrently");
        }
        Ok(())
    }

    /// Renews the linked or existing subscription, or creates the first one.
    async fn settle_subscription(
        &self,
        intent: &PaymentIntent,
        plan: Plan,
        linked: Option<SubscriptionId>,
    ) -> Result<SubscriptionId, DomainError> {
        let existing = match linked {
            Some(id) => self.subscriptions.find_by_id(&id).await?,
            None => None,
        };
        let existing = match existing {
            Some(sub) => Some(sub),
            None => self.subscriptions.find_by_user(&intent.payer_id).await?,
        };

        if let Some(sub) = existing {
            let renewed = self
                .renew
                .handle(RenewSubscriptionCommand {
                    subscription_id: sub.id,
                })
                .await?;
            return Ok(renewed.subscription.id);
        }

        let created = self
            .create
            .handle(CreateSubscriptionCommand {
                user_id: intent.payer_id,
                plan,
                provider: intent.provider,
                price: self.terms.price,
                billing_cycle_days: self.terms.billing_cycle_days,
            })
            .await;

        match created {
            Ok(result) => Ok(result.subscription.id),
            Err(e) if e.code == ErrorCode::ConcurrencyConflict => {
                // A concurrent delivery created it first.
                let sub = self
                    .subscriptions
                    .find_by_user(&intent.payer_id)
                    .await?
                    .ok_or(e)?;
                Ok(sub.id)
            }
            Err(e) => Err(e),
        }
    }
}

/// Purchase failures that no redelivery can fix.
fn is_unfulfillable(err: &DomainError) -> bool {
    matches!(
        err.code,
        ErrorCode::ShareNotFound
            | ErrorCode::ContactNotFound
            | ErrorCode::Forbidden
            | ErrorCode::ValidationFailed
    )
}
