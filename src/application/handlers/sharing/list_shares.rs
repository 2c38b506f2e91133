//! Catalogue queries over shares.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::sharing::Share;
use crate::ports::ShareRepository;

/// Largest public catalogue page.
pub const MAX_PUBLIC_PAGE: u32 = 50;

#[derive(Debug, Clone, Default)]
pub struct ListPublicSharesQuery {
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Active Open and Paid shares, newest first.
pub struct ListPublicSharesHandler {
    shares: Arc<dyn ShareRepository>,
    max_page: u32,
}

impl ListPublicSharesHandler {
    pub fn new(shares: Arc<dyn ShareRepository>) -> Self {
        Self::with_max_page(shares, MAX_PUBLIC_PAGE)
    }

    pub fn with_max_page(shares: Arc<dyn ShareRepository>, max_page: u32) -> Self {
        Self { shares, max_page }
    }

    pub async fn handle(&self, query: ListPublicSharesQuery) -> Result<Vec<Share>, DomainError> {
        let limit = query.limit.unwrap_or(self.max_page).clamp(1, self.max_page);
        self.shares.list_public(limit, query.offset).await
    }
}

#[derive(Debug, Clone)]
pub struct ListUserSharesQuery {
    pub owner_id: UserId,
}

pub struct ListUserSharesHandler {
    shares: Arc<dyn ShareRepository>,
}

impl ListUserSharesHandler {
    pub fn new(shares: Arc<dyn ShareRepository>) -> Self {
        Self { shares }
    }

    pub async fn handle(&self, query: ListUserSharesQuery) -> Result<Vec<Share>, DomainError> {
        self.shares.list_by_owner(&query.owner_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{rub, Fixture};
    use crate::domain::foundation::{Currency, Money};
    use crate::domain::sharing::Visibility;

    #[tokio::test]
    async fn public_listing_excludes_restricted_and_caps_page() {
        let fx = Fixture::new();
        let owner = UserId::new();
        fx.seed_share(owner, Visibility::Open, Money::zero(Currency::Rub)).await;
        fx.seed_share(owner, Visibility::Paid, rub(100)).await;
        fx.seed_share(owner, Visibility::Restricted, Money::zero(Currency::Rub)).await;

        let handler = ListPublicSharesHandler::with_max_page(fx.shares.clone(), 1);
        let page = handler
            .handle(ListPublicSharesQuery { limit: Some(500), offset: 0 })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);

        let all = ListPublicSharesHandler::new(fx.shares.clone())
            .handle(ListPublicSharesQuery::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|s| s.visibility.is_listed()));
    }

    #[tokio::test]
    async fn user_listing_returns_only_own_shares() {
        let fx = Fixture::new();
        let owner = UserId::new();
        fx.seed_share(owner, Visibility::Restricted, Money::zero(Currency::Rub)).await;
        fx.seed_share(UserId::new(), Visibility::Open, Money::zero(Currency::Rub)).await;

        let handler = ListUserSharesHandler::new(fx.shares.clone());
        let mine = handler.handle(ListUserSharesQuery { owner_id: owner }).await.unwrap();

        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].owner_id, owner);
    }
}
