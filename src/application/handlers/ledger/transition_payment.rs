//! TransitionPaymentHandler - the idempotent status update.
//!
//! Providers deliver at least once and out of order. A disallowed or
//! repeated transition is logged and answered with the stored intent, never
//! an error. Concurrent writers are serialised by a compare-and-set on the
//! previous status.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::foundation::{DomainError, ErrorCode, TransitionOutcome};
use crate::domain::payment::{PaymentIntent, PaymentStatus};
use crate::ports::PaymentLedgerRepository;

use super::lookup_payment::{payment_not_found, PaymentLocator};

/// Attempts before a contended compare-and-set gives up.
const MAX_CAS_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct TransitionPaymentCommand {
    pub locator: PaymentLocator,
    pub status: PaymentStatus,
    pub payload: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct TransitionPaymentResult {
    /// The intent as stored after the call.
    pub intent: PaymentIntent,
    pub outcome: TransitionOutcome<PaymentStatus>,
}

pub struct TransitionPaymentHandler {
    ledger: Arc<dyn PaymentLedgerRepository>,
}

impl TransitionPaymentHandler {
    pub fn new(ledger: Arc<dyn PaymentLedgerRepository>) -> Self {
        Self { ledger }
    }

    pub async fn handle(
        &self,
        cmd: TransitionPaymentCommand,
    ) -> Result<TransitionPaymentResult, DomainError> {
        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let stored = cmd
                .locator
                .find(self.ledger.as_ref())
                .await?
                .ok_or_else(|| payment_not_found(&cmd.locator))?;

            let mut intent = stored.clone();
            let outcome = intent.apply_status(cmd.status, cmd.payload.clone());

            match outcome {
                TransitionOutcome::Moved(next) => {
                    if self.ledger.update_status(&intent, stored.status).await? {
                        info!(
                            payment_id = %intent.id,
                            from = %stored.status,
                            to = %next,
                            "Payment status changed"
                        );
                        return Ok(TransitionPaymentResult { intent, outcome });
                    }
                    debug!(payment_id = %intent.id, attempt, "Payment status raced, reloading");
                }
                TransitionOutcome::Unchanged => {
                    debug!(payment_id = %stored.id, status = %stored.status, "Duplicate status update");
                    return Ok(TransitionPaymentResult {
                        intent: stored,
                        outcome,
                    });
                }
                TransitionOutcome::Rejected => {
                    warn!(
                        payment_id = %stored.id,
                        from = %stored.status,
                        to = %cmd.status,
                        "Ignoring disallowed payment transition"
                    );
                    return Ok(TransitionPaymentResult {
                        intent: stored,
                        outcome,
                    });
                }
            }
        }

        Err(DomainError::new(
            ErrorCode::ConcurrencyConflict,
            "Payment status kept changing underneath the update",
        ))
    }
}
