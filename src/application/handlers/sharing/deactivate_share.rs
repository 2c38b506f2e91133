//! DeactivateShareHandler - withdraws a share. Past purchases are unaffected.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{DomainError, ErrorCode, ShareId, UserId};
use crate::ports::ShareRepository;

#[derive(Debug, Clone)]
pub struct DeactivateShareCommand {
    pub share_id: ShareId,
    pub owner_id: UserId,
}

pub struct DeactivateShareHandler {
    shares: Arc<dyn ShareRepository>,
}

impl DeactivateShareHandler {
    pub fn new(shares: Arc<dyn ShareRepository>) -> Self {
        Self { shares }
    }

    pub async fn handle(&self, cmd: DeactivateShareCommand) -> Result<(), DomainError> {
        let mut share = self.shares.find_by_id(&cmd.share_id).await?.ok_or_else(|| {
            DomainError::new(ErrorCode::ShareNotFound, "Share not found")
                .with_detail("share_id", cmd.share_id.to_string())
        })?;

        let was_active = share.is_active;
        share.deactivate(&cmd.owner_id)?;
        if was_active {
            self.shares.update(&share).await?;
            info!(share_id = %share.id, "Share deactivated");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::foundation::{Currency, Money};
    use crate::domain::sharing::Visibility;

    #[tokio::test]
    async fn owner_deactivates_share() {
        let fx = Fixture::new();
        let owner = UserId::new();
        let share = fx.seed_share(owner, Visibility::Open, Money::zero(Currency::Rub)).await;
        let handler = DeactivateShareHandler::new(fx.shares.clone());

        handler
            .handle(DeactivateShareCommand { share_id: share.id, owner_id: owner })
            .await
            .unwrap();

        let stored = fx.shares.find_by_id(&share.id).await.unwrap().unwrap();
        assert!(!stored.is_active);
        assert!(fx.shares.find_by_token(&share.access_token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deactivation_is_idempotent() {
        let fx = Fixture::new();
        let owner = UserId::new();
        let share = fx.seed_share(owner, Visibility::Open, Money::zero(Currency::Rub)).await;
        let handler = DeactivateShareHandler::new(fx.shares.clone());
        let cmd = DeactivateShareCommand { share_id: share.id, owner_id: owner };

        handler.handle(cmd.clone()).await.unwrap();
        handler.handle(cmd).await.unwrap();
    }

    #[tokio::test]
    async fn non_owner_is_forbidden() {
        let fx = Fixture::new();
        let share = fx
            .seed_share(UserId::new(), Visibility::Open, Money::zero(Currency::Rub))
            .await;
        let handler = DeactivateShareHandler::new(fx.shares.clone());

        let err = handler
            .handle(DeactivateShareCommand { share_id: share.id, owner_id: UserId::new() })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn unknown_share_is_not_found() {
        let fx = Fixture::new();
        let handler = DeactivateShareHandler::new(fx.shares.clone());
        let err = handler
            .handle(DeactivateShareCommand { share_id: ShareId::new(), owner_id: UserId::new() })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ShareNotFound);
    }
}
