//! Share repository port.
//!
//! # Design
//!
//! - **One active share per (contact, owner)**: enforced by a partial unique
//!   index; `save` reports a clash as `ConcurrencyConflict`
//! - **Atomic counters**: `increment_*` are single storage statements, never
//!   read-modify-write in application code

use async_trait::async_trait;

use crate::domain::foundation::{ContactId, DomainError, ShareId, UserId};
use crate::domain::sharing::{AccessToken, Share};

/// Repository port for Share persistence.
#[async_trait]
pub trait ShareRepository: Send + Sync {
    /// Insert a new share.
    ///
    /// # Errors
    ///
    /// - `ConcurrencyConflict` if an active share already exists for the
    ///   same (contact, owner) or the token clashes
    /// - `DatabaseError` on persistence failure
    async fn save(&self, share: &Share) -> Result<(), DomainError>;

    /// Overwrite configuration and active flag of an existing share.
    ///
    /// Counters and the access token are never written by `update`.
    ///
    /// # Errors
    ///
    /// - `ShareNotFound` if the share doesn't exist
    async fn update(&self, share: &Share) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &ShareId) -> Result<Option<Share>, DomainError>;

    async fn find_by_token(&self, token: &AccessToken) -> Result<Option<Share>, DomainError>;

    /// The active share of a contact by its owner, if any.
    async fn find_active(
        &self,
        owner_id: &UserId,
        contact_id: &ContactId,
    ) -> Result<Option<Share>, DomainError>;

    /// Active Open and Paid shares, newest first.
    async fn list_public(&self, limit: u32, offset: u32) -> Result<Vec<Share>, DomainError>;

    /// Active shares published by `owner_id`, newest first.
    async fn list_by_owner(&self, owner_id: &UserId) -> Result<Vec<Share>, DomainError>;

    /// `view_count = view_count + 1`
    async fn increment_views(&self, id: &ShareId) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ShareRepository) {}
    }
}
