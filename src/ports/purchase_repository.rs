//! Purchase repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ShareId, UserId};
use crate::domain::purchase::Purchase;
use crate::domain::sharing::ContactSnapshot;

/// Repository port for purchases.
///
/// Implementations must enforce uniqueness on (buyer, share) at the storage
/// layer; that constraint is the final arbiter between concurrent buyers.
#[async_trait]
pub trait PurchaseRepository: Send + Sync {
    /// Atomically writes the buyer's contact copy, the purchase row and the
    /// share's purchase counter.
    ///
    /// Either all three writes happen or none do.
    ///
    /// # Errors
    ///
    /// - `ConcurrencyConflict` if the buyer already owns this share
    /// - `DatabaseError` on persistence failure
    async fn record(&self, purchase: &Purchase, snapshot: &ContactSnapshot)
        -> Result<(), DomainError>;

    async fn find_by_buyer_and_share(
        &self,
        buyer_id: &UserId,
        share_id: &ShareId,
    ) -> Result<Option<Purchase>, DomainError>;

    /// Buyer's purchases, newest first.
    async fn list_by_buyer(&self, buyer_id: &UserId, limit: u32)
        -> Result<Vec<Purchase>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn PurchaseRepository) {}
    }
}
