//! Payment lookups by internal id or by provider correlation id.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId};
use crate::domain::payment::{PaymentIntent, Provider};
use crate::ports::PaymentLedgerRepository;

/// How a caller refers to a payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentLocator {
    Id(PaymentId),
    Correlation {
        provider: Provider,
        correlation_id: String,
    },
}

impl PaymentLocator {
    pub(crate) async fn find(
        &self,
        ledger: &dyn PaymentLedgerRepository,
    ) -> Result<Option<PaymentIntent>, DomainError> {
        match self {
            PaymentLocator::Id(id) => ledger.find_by_id(id).await,
            PaymentLocator::Correlation {
                provider,
                correlation_id,
            } => ledger.find_by_correlation_id(*provider, correlation_id).await,
        }
    }
}

pub(crate) fn payment_not_found(locator: &PaymentLocator) -> DomainError {
    let err = DomainError::new(ErrorCode::PaymentNotFound, "Payment not found");
    match locator {
        PaymentLocator::Id(id) => err.with_detail("payment_id", id.to_string()),
        PaymentLocator::Correlation { correlation_id, .. } => {
            err.with_detail("correlation_id", correlation_id.clone())
        }
    }
}

/// Query by the provider's payment identifier.
#[derive(Debug, Clone)]
pub struct LookupByCorrelationIdQuery {
    pub provider: Provider,
    pub correlation_id: String,
}

pub struct LookupByCorrelationIdHandler {
    ledger: Arc<dyn PaymentLedgerRepository>,
}

impl LookupByCorrelationIdHandler {
    pub fn new(ledger: Arc<dyn PaymentLedgerRepository>) -> Self {
        Self { ledger }
    }

    /// Returns `PaymentNotFound` for ids this service never issued.
    pub async fn handle(&self, query: LookupByCorrelationIdQuery) -> Result<PaymentIntent, DomainError> {
        let locator = PaymentLocator::Correlation {
            provider: query.provider,
            correlation_id: query.correlation_id,
        };
        locator
            .find(self.ledger.as_ref())
            .await?
            .ok_or_else(|| payment_not_found(&locator))
    }
}
