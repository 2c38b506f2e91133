//! UpdateFieldVisibilityHandler - changes only which fields a share shows.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{DomainError, ShareId, UserId};
use crate::domain::sharing::{FieldSet, Share};
use crate::ports::ShareRepository;

use super::ShareLocator;

#[derive(Debug, Clone)]
pub struct UpdateFieldVisibilityCommand {
    pub share_id: ShareId,
    pub owner_id: UserId,
    pub visible_fields: Option<FieldSet>,
    pub hidden_fields: FieldSet,
}

pub struct UpdateFieldVisibilityHandler {
    shares: Arc<dyn ShareRepository>,
}

impl UpdateFieldVisibilityHandler {
    pub fn new(shares: Arc<dyn ShareRepository>) -> Self {
        Self { shares }
    }

    pub async fn handle(&self, cmd: UpdateFieldVisibilityCommand) -> Result<Share, DomainError> {
        let mut share = ShareLocator::Id(cmd.share_id)
            .resolve_active(self.shares.as_ref())
            .await?;

        share.update_field_visibility(&cmd.owner_id, cmd.visible_fields, cmd.hidden_fields)?;
        self.shares.update(&share).await?;

        info!(
            share_id = %share.id,
            visible = share.effective_fields().len(),
            "Share field visibility updated"
        );
        Ok(share)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::foundation::{Currency, ErrorCode, Money};
    use crate::domain::sharing::{ContactField, Visibility};

    #[tokio::test]
    async fn owner_hides_a_field() {
        let fx = Fixture::new();
        let owner = UserId::new();
        let share = fx.seed_share(owner, Visibility::Open, Money::zero(Currency::Rub)).await;
        let handler = UpdateFieldVisibilityHandler::new(fx.shares.clone());

        let updated = handler
            .handle(UpdateFieldVisibilityCommand {
                share_id: share.id,
                owner_id: owner,
                visible_fields: None,
                hidden_fields: [ContactField::Company].into_iter().collect(),
            })
            .await
            .unwrap();

        assert!(!updated.effective_fields().contains(&ContactField::Company));
        assert_eq!(updated.access_token, share.access_token);
    }

    #[tokio::test]
    async fn stranger_cannot_change_fields() {
        let fx = Fixture::new();
        let share = fx
            .seed_share(UserId::new(), Visibility::Open, Money::zero(Currency::Rub))
            .await;
        let handler = UpdateFieldVisibilityHandler::new(fx.shares.clone());

        let err = handler
            .handle(UpdateFieldVisibilityCommand {
                share_id: share.id,
                owner_id: UserId::new(),
                visible_fields: Some(FieldSet::new()),
                hidden_fields: FieldSet::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }
}
