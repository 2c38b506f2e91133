//! Read-side purchase queries.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ShareId, UserId};
use crate::domain::purchase::Purchase;
use crate::ports::PurchaseRepository;

/// Default and maximum purchase history page.
pub const PURCHASE_HISTORY_LIMIT: u32 = 50;

#[derive(Debug, Clone)]
pub struct HasPurchasedQuery {
    pub buyer_id: UserId,
    pub share_id: ShareId,
}

pub struct HasPurchasedHandler {
    purchases: Arc<dyn PurchaseRepository>,
}

impl HasPurchasedHandler {
    pub fn new(purchases: Arc<dyn PurchaseRepository>) -> Self {
        Self { purchases }
    }

    pub async fn handle(&self, query: HasPurchasedQuery) -> Result<bool, DomainError> {
        Ok(self
            .purchases
            .find_by_buyer_and_share(&query.buyer_id, &query.share_id)
            .await?
            .is_some())
    }
}

#[derive(Debug, Clone)]
pub struct ListUserPurchasesQuery {
    pub buyer_id: UserId,
    pub limit: Option<u32>,
}

/// Newest purchases first.
pub struct ListUserPurchasesHandler {
    purchases: Arc<dyn PurchaseRepository>,
}

impl ListUserPurchasesHandler {
    pub fn new(purchases: Arc<dyn PurchaseRepository>) -> Self {
        Self { purchases }
    }

    pub async fn handle(&self, query: ListUserPurchasesQuery) -> Result<Vec<Purchase>, DomainError> {
        let limit = query
            .limit
            .unwrap_or(PURCHASE_HISTORY_LIMIT)
            .clamp(1, PURCHASE_HISTORY_LIMIT);
        self.purchases.list_by_buyer(&query.buyer_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::foundation::{Currency, Money};
    use crate::domain::sharing::{ContactSnapshot, Visibility};
    use crate::ports::ContactStore;

    #[tokio::test]
    async fn reports_and_lists_purchases() {
        let fx = Fixture::new();
        let buyer = UserId::new();
        let share = fx
            .seed_share(UserId::new(), Visibility::Open, Money::zero(Currency::Rub))
            .await;
        let has = HasPurchasedHandler::new(fx.purchases.clone());
        let query = HasPurchasedQuery { buyer_id: buyer, share_id: share.id };
        assert!(!has.handle(query.clone()).await.unwrap());

        let contact = fx.contacts.get(&share.contact_id).await.unwrap().unwrap();
        let purchase = Purchase::prepare(&share, buyer, None, Money::zero(Currency::Rub));
        fx.purchases
            .record(&purchase, &ContactSnapshot::from_share(&share, &contact.fields))
            .await
            .unwrap();

        assert!(has.handle(query).await.unwrap());
        let listed = ListUserPurchasesHandler::new(fx.purchases.clone())
            .handle(ListUserPurchasesQuery { buyer_id: buyer, limit: None })
            .await
            .unwrap();
        assert_eq!(listed, vec![purchase]);
    }
}
