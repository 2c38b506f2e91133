//! Settlement ledger repository port.
//!
//! The ledger is the single source of truth correlating a provider's
//! payment id to an internal [`PaymentIntent`].
//!
//! # Example
//!
//! ```ignore
//! // Optimistic status update: retry when another delivery won the race.
//! loop {
//!     let mut intent = ledger.find_by_id(&id).await?.ok_or(not_found)?;
//!     let expected = intent.status;
//!     if !intent.apply_status(target, payload.clone()).is_moved() {
//!         return Ok(intent);
//!     }
//!     if ledger.update_status(&intent, expected).await? {
//!         return Ok(intent);
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PaymentId, Timestamp, UserId};
use crate::domain::payment::{PaymentIntent, PaymentStatus, Provider};

/// Repository port for payment intents.
#[async_trait]
pub trait PaymentLedgerRepository: Send + Sync {
    /// Insert a new intent.
    async fn save(&self, intent: &PaymentIntent) -> Result<(), DomainError>;

    /// Persist checkout references, description and target link.
    ///
    /// Does not touch status or settlement.
    ///
    /// # Errors
    ///
    /// - `PaymentNotFound` if the intent doesn't exist
    /// - `ConcurrencyConflict` if the correlation id is already taken
    async fn update_checkout(&self, intent: &PaymentIntent) -> Result<(), DomainError>;

    /// Compare-and-set the status.
    ///
    /// Writes status, payload and `updated_at` only if the stored status
    /// still equals `expected`. Returns false when another writer won.
    async fn update_status(
        &self,
        intent: &PaymentIntent,
        expected: PaymentStatus,
    ) -> Result<bool, DomainError>;

    /// Stamps `settled_at` if unset. Returns false if already settled.
    async fn mark_settled(&self, id: &PaymentId, at: Timestamp) -> Result<bool, DomainError>;

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<PaymentIntent>, DomainError>;

    /// Lookup by the provider's payment identifier.
    async fn find_by_correlation_id(
        &self,
        provider: Provider,
        correlation_id: &str,
    ) -> Result<Option<PaymentIntent>, DomainError>;

    /// Most recent intents of a payer.
    async fn list_by_payer(
        &self,
        payer_id: &UserId,
        limit: u32,
    ) -> Result<Vec<PaymentIntent>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_ledger_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn PaymentLedgerRepository) {}
    }
}
