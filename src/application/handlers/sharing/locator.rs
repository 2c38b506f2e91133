//! Share lookup by id or by public access token.

use crate::domain::foundation::{DomainError, ErrorCode, ShareId};
use crate::domain::sharing::{AccessToken, Share};
use crate::ports::ShareRepository;

/// How a caller refers to a share.
///
/// Owners use the id; everyone arriving through a deep link only knows
/// the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareLocator {
    Id(ShareId),
    Token(AccessToken),
}

impl ShareLocator {
    /// Loads the share; missing and inactive shares are both `ShareNotFound`.
    pub async fn resolve_active(&self, shares: &dyn ShareRepository) -> Result<Share, DomainError> {
        let found = match self {
            ShareLocator::Id(id) => shares.find_by_id(id).await?,
            ShareLocator::Token(token) => shares.find_by_token(token).await?,
        };
        found
            .filter(|share| share.is_active)
            .ok_or_else(|| DomainError::new(ErrorCode::ShareNotFound, "Share not found"))
    }
}

impl From<ShareId> for ShareLocator {
    fn from(id: ShareId) -> Self {
        ShareLocator::Id(id)
    }
}

impl From<AccessToken> for ShareLocator {
    fn from(token: AccessToken) -> Self {
        ShareLocator::Token(token)
    }
}
