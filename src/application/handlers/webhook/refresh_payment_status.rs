//! RefreshPaymentStatusHandler - payer-initiated status poll.
//!
//! Resolves a Pending intent when the webhook was lost or is late. The
//! provider's answer goes through the same [`PaymentSettler`] as a webhook.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::application::handlers::purchase::DEFAULT_CHECKOUT_TIMEOUT;
use crate::application::ProviderRegistry;
use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, UserId};
use crate::domain::payment::{PaymentIntent, PaymentStatus};
use crate::ports::{PaymentError, PaymentLedgerRepository};

use super::settle_payment::PaymentSettler;

#[derive(Debug, Clone)]
pub struct RefreshPaymentStatusCommand {
    pub payment_id: PaymentId,
    pub requester_id: UserId,
}

pub struct RefreshPaymentStatusHandler {
    ledger: Arc<dyn PaymentLedgerRepository>,
    providers: ProviderRegistry,
    settler: Arc<PaymentSettler>,
    timeout: Duration,
}

impl RefreshPaymentStatusHandler {
    pub fn new(
        ledger: Arc<dyn PaymentLedgerRepository>,
        providers: ProviderRegistry,
        settler: Arc<PaymentSettler>,
    ) -> Self {
        Self {
            ledger,
            providers,
            settler,
            timeout: DEFAULT_CHECKOUT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the intent as stored after reconciling the provider's answer.
    pub async fn handle(&self, cmd: RefreshPaymentStatusCommand) -> Result<PaymentIntent, DomainError> {
        let intent = self.load(&cmd.payment_id).await?;
        if intent.payer_id != cmd.requester_id {
            return Err(DomainError::forbidden("Only the payer can check this payment"));
        }

        // Settled or terminal intents have nothing left to learn.
        if intent.status != PaymentStatus::Pending && !intent.needs_settlement() {
            return Ok(intent);
        }
        let Some(correlation_id) = intent.correlation_id.clone() else {
            debug!(payment_id = %intent.id, "Checkout never reached the provider");
            return Ok(intent);
        };

        let adapter = self.providers.require(intent.provider)?;
        let polled = tokio::time::timeout(self.timeout, adapter.fetch_payment(&correlation_id))
            .await
            .map_err(|_| PaymentError::timeout("Payment provider did not answer in time"))?;

        match polled {
            Ok(Some(event)) => {
                self.settler.apply(intent.provider, event).await?;
            }
            Ok(None) => {
                debug!(payment_id = %intent.id, "Payment still pending at provider");
            }
            Err(e) => {
                warn!(payment_id = %intent.id, provider = %intent.provider, error = %e, "Status poll failed");
                return Err(e.into());
            }
        }

        self.load(&cmd.payment_id).await
    }

    async fn load(&self, id: &PaymentId) -> Result<PaymentIntent, DomainError> {
        self.ledger.find_by_id(id).await?.ok_or_else(|| {
            DomainError::new(ErrorCode::PaymentNotFound, "Payment not found")
                .with_detail("payment_id", id.to_string())
        })
    }
}
