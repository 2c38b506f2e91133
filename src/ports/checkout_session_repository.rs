//! Checkout session repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::purchase::{CheckoutSession, CheckoutTarget};

/// Stores at most one session per (buyer, target).
#[async_trait]
pub trait CheckoutSessionRepository: Send + Sync {
    /// Insert or replace the session for its (buyer, target).
    async fn upsert(&self, session: &CheckoutSession) -> Result<(), DomainError>;

    async fn find(
        &self,
        buyer_id: &UserId,
        target: &CheckoutTarget,
    ) -> Result<Option<CheckoutSession>, DomainError>;

    async fn delete(&self, buyer_id: &UserId, target: &CheckoutTarget) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_session_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn CheckoutSessionRepository) {}
    }
}
