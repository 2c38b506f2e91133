//! OpenPaymentHandler - records a new pending payment intent.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{DomainError, Money, UserId};
use crate::domain::payment::{PaymentIntent, PaymentTarget, Provider};
use crate::ports::PaymentLedgerRepository;

#[derive(Debug, Clone)]
pub struct OpenPaymentCommand {
    pub payer_id: UserId,
    pub target: PaymentTarget,
    pub provider: Provider,
    /// Amount in the provider's settlement currency.
    pub amount: Money,
    pub description: Option<String>,
}

pub struct OpenPaymentHandler {
    ledger: Arc<dyn PaymentLedgerRepository>,
}

impl OpenPaymentHandler {
    pub fn new(ledger: Arc<dyn PaymentLedgerRepository>) -> Self {
        Self { ledger }
    }

    pub async fn handle(&self, cmd: OpenPaymentCommand) -> Result<PaymentIntent, DomainError> {
        if cmd.amount.is_zero() {
            return Err(DomainError::validation("amount", "Payment amount must be above zero"));
        }

        let intent = PaymentIntent::open(
            cmd.payer_id,
            cmd.target,
            cmd.provider,
            cmd.amount,
            cmd.description,
        );
        self.ledger.save(&intent).await?;

        info!(
            payment_id = %intent.id,
            payer_id = %intent.payer_id,
            purpose = %intent.purpose(),
            provider = %intent.provider,
            amount = %intent.amount,
            "Payment intent opened"
        );
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{rub, Fixture};
    use crate::domain::foundation::{Currency, ErrorCode, ShareId};
    use crate::domain::payment::PaymentStatus;

    #[tokio::test]
    async fn opens_pending_intent() {
        let fx = Fixture::new();
        let handler = OpenPaymentHandler::new(fx.ledger.clone());

        let intent = handler
            .handle(OpenPaymentCommand {
                payer_id: UserId::new(),
                target: PaymentTarget::Share { share_id: ShareId::new() },
                provider: Provider::YooKassa,
                amount: rub(500),
                description: None,
            })
            .await
            .unwrap();

        assert_eq!(intent.status, PaymentStatus::Pending);
        assert!(fx.ledger.find_by_id(&intent.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn zero_amount_is_rejected() {
        let fx = Fixture::new();
        let handler = OpenPaymentHandler::new(fx.ledger.clone());

        let err = handler
            .handle(OpenPaymentCommand {
                payer_id: UserId::new(),
                target: PaymentTarget::Share { share_id: ShareId::new() },
                provider: Provider::YooKassa,
                amount: Money::zero(Currency::Rub),
                description: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
