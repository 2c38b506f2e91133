//! ResolveShareByTokenHandler and CanViewShareHandler - deep-link access.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ShareId, UserId};
use crate::domain::sharing::{AccessToken, Share};
use crate::ports::{PurchaseRepository, ShareRepository};

use super::ShareLocator;

pub struct ResolveShareByTokenHandler {
    shares: Arc<dyn ShareRepository>,
}

impl ResolveShareByTokenHandler {
    pub fn new(shares: Arc<dyn ShareRepository>) -> Self {
        Self { shares }
    }

    /// Inactive shares resolve to `ShareNotFound`.
    pub async fn handle(&self, token: AccessToken) -> Result<Share, DomainError> {
        ShareLocator::Token(token)
            .resolve_active(self.shares.as_ref())
            .await
    }
}

/// Query whether a viewer may see a share's contents.
#[derive(Debug, Clone)]
pub struct CanViewShareQuery {
    pub share_id: ShareId,
    pub viewer_id: UserId,
}

/// Paid shares count as viewable once the viewer holds a purchase.
pub struct CanViewShareHandler {
    shares: Arc<dyn ShareRepository>,
    purchases: Arc<dyn PurchaseRepository>,
}

impl CanViewShareHandler {
    pub fn new(shares: Arc<dyn ShareRepository>, purchases: Arc<dyn PurchaseRepository>) -> Self {
        Self { shares, purchases }
    }

    pub async fn handle(&self, query: CanViewShareQuery) -> Result<bool, DomainError> {
        let share = ShareLocator::Id(query.share_id)
            .resolve_active(self.shares.as_ref())
            .await?;
        can_view(self.purchases.as_ref(), &share, &query.viewer_id).await
    }
}

/// Visibility check that looks up the purchase only when it matters.
async fn can_view(
    purchases: &dyn PurchaseRepository,
    share: &Share,
    viewer_id: &UserId,
) -> Result<bool, DomainError> {
    if share.can_view(viewer_id, false) {
        return Ok(true);
    }
    let purchased = purchases
        .find_by_buyer_and_share(viewer_id, &share.id)
        .await?
        .is_some();
    Ok(share.can_view(viewer_id, purchased))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{rub, Fixture};
    use crate::domain::foundation::{Currency, ErrorCode, Money};
    use crate::domain::purchase::Purchase;
    use crate::domain::sharing::{ContactSnapshot, Visibility};
    use crate::ports::ContactStore;

    #[tokio::test]
    async fn resolves_active_share_by_token() {
        let fx = Fixture::new();
        let share = fx
            .seed_share(UserId::new(), Visibility::Open, Money::zero(Currency::Rub))
            .await;
        let handler = ResolveShareByTokenHandler::new(fx.shares.clone());

        let resolved = handler.handle(share.access_token.clone()).await.unwrap();
        assert_eq!(resolved.id, share.id);
    }

    #[tokio::test]
    async fn inactive_share_does_not_resolve() {
        let fx = Fixture::new();
        let owner = UserId::new();
        let mut share = fx.seed_share(owner, Visibility::Open, Money::zero(Currency::Rub)).await;
        share.deactivate(&owner).unwrap();
        fx.shares.update(&share).await.unwrap();
        let handler = ResolveShareByTokenHandler::new(fx.shares.clone());

        let err = handler.handle(share.access_token.clone()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ShareNotFound);
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let fx = Fixture::new();
        let handler = ResolveShareByTokenHandler::new(fx.shares.clone());
        let err = handler.handle(AccessToken::generate()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn paid_share_becomes_viewable_after_purchase() {
        let fx = Fixture::new();
        let owner = UserId::new();
        let buyer = UserId::new();
        let share = fx.seed_share(owner, Visibility::Paid, rub(500)).await;
        let handler = CanViewShareHandler::new(fx.shares.clone(), fx.purchases.clone());
        let query = CanViewShareQuery { share_id: share.id, viewer_id: buyer };

        assert!(!handler.handle(query.clone()).await.unwrap());

        let contact = fx.contacts.get(&share.contact_id).await.unwrap().unwrap();
        let purchase = Purchase::prepare(&share, buyer, None, rub(500));
        fx.purchases
            .record(&purchase, &ContactSnapshot::from_share(&share, &contact.fields))
            .await
            .unwrap();

        assert!(handler.handle(query).await.unwrap());
    }

    #[tokio::test]
    async fn owner_can_always_view() {
        let fx = Fixture::new();
        let owner = UserId::new();
        let share = fx.seed_share(owner, Visibility::Restricted, Money::zero(Currency::Rub)).await;
        let handler = CanViewShareHandler::new(fx.shares.clone(), fx.purchases.clone());

        assert!(handler
            .handle(CanViewShareQuery { share_id: share.id, viewer_id: owner })
            .await
            .unwrap());
    }
}
