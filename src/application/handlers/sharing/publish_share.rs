//! PublishShareHandler - creates or reconfigures the active share of a contact.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::handlers::subscription::{CheckSellerAccessHandler, CheckSellerAccessQuery};
use crate::domain::foundation::{ContactId, DomainError, ErrorCode, Money, UserId};
use crate::domain::sharing::{deep_link, FieldSet, Share, ShareSettings, Visibility};
use crate::ports::{ContactStore, ShareRepository};

/// Command to publish a contact.
#[derive(Debug, Clone)]
pub struct PublishShareCommand {
    pub owner_id: UserId,
    pub contact_id: ContactId,
    pub visibility: Visibility,
    pub allowed_viewers: BTreeSet<UserId>,
    /// `None` selects the default visible set.
    pub visible_fields: Option<FieldSet>,
    pub hidden_fields: FieldSet,
    pub price: Money,
    pub description: Option<String>,
}

/// Result of publishing.
#[derive(Debug, Clone)]
pub struct PublishShareResult {
    pub share: Share,
    /// False when an existing active share was updated in place.
    pub created: bool,
    pub deep_link: String,
}

/// Handler for publishing shares.
///
/// At most one active share exists per (owner, contact). Republishing
/// updates that share and keeps its access token.
pub struct PublishShareHandler {
    shares: Arc<dyn ShareRepository>,
    contacts: Arc<dyn ContactStore>,
    seller_access: Arc<CheckSellerAccessHandler>,
    bot_username: String,
}

impl PublishShareHandler {
    pub fn new(
        shares: Arc<dyn ShareRepository>,
        contacts: Arc<dyn ContactStore>,
        seller_access: Arc<CheckSellerAccessHandler>,
        bot_username: impl Into<String>,
    ) -> Self {
        Self {
            shares,
            contacts,
            seller_access,
            bot_username: bot_username.into(),
        }
    }

    pub async fn handle(&self, cmd: PublishShareCommand) -> Result<PublishShareResult, DomainError> {
        let contact = self.contacts.get(&cmd.contact_id).await?.ok_or_else(|| {
            DomainError::new(ErrorCode::ContactNotFound, "Contact not found")
                .with_detail("contact_id", cmd.contact_id.to_string())
        })?;
        if contact.owner_id != cmd.owner_id {
            return Err(DomainError::forbidden("Only the contact owner can publish it"));
        }

        let settings = ShareSettings::new(
            cmd.visibility,
            cmd.allowed_viewers,
            cmd.visible_fields,
            cmd.hidden_fields,
            cmd.price,
            cmd.description,
        )?;

        if settings.requires_payment()
            && !self
                .seller_access
                .handle(CheckSellerAccessQuery::now(cmd.owner_id))
                .await?
        {
            return Err(DomainError::new(
                ErrorCode::SellerAccessRequired,
                "Selling a share requires an active seller subscription",
            ));
        }

        let (share, created) = self.upsert(cmd.owner_id, cmd.contact_id, settings).await?;

        info!(
            share_id = %share.id,
            owner_id = %share.owner_id,
            visibility = %share.visibility,
            created,
            "Share published"
        );

        let deep_link = deep_link(&self.bot_username, &share.access_token);
        Ok(PublishShareResult {
            share,
            created,
            deep_link,
        })
    }

    async fn upsert(
        &self,
        owner_id: UserId,
        contact_id: ContactId,
        settings: ShareSettings,
    ) -> Result<(Share, bool), DomainError> {
        if let Some(existing) = self.shares.find_active(&owner_id, &contact_id).await? {
            return self.reconfigure(existing, settings).await;
        }

        let share = Share::publish(contact_id, owner_id, settings.clone());
        match self.shares.save(&share).await {
            Ok(()) => Ok((share, true)),
            Err(e) if e.code == ErrorCode::ConcurrencyConflict => {
                // A concurrent publish created the share first.
                debug!(contact_id = %contact_id, "Publish raced, updating winner");
                let existing = self
                    .shares
                    .find_active(&owner_id, &contact_id)
                    .await?
                    .ok_or(e)?;
                self.reconfigure(existing, settings).await
            }
            Err(e) => Err(e),
        }
    }

    async fn reconfigure(
        &self,
        mut share: Share,
        settings: ShareSettings,
    ) -> Result<(Share, bool), DomainError> {
        share.reconfigure(settings);
        self.shares.update(&share).await?;
        Ok((share, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{rub, Fixture, BOT};
    use crate::domain::foundation::Currency;
    use crate::domain::sharing::ContactField;

    fn handler(fx: &Fixture) -> PublishShareHandler {
        PublishShareHandler::new(
            fx.shares.clone(),
            fx.contacts.clone(),
            Arc::new(CheckSellerAccessHandler::new(fx.subscriptions.clone())),
            BOT,
        )
    }

    fn open_command(owner: UserId, contact: ContactId) -> PublishShareCommand {
        PublishShareCommand {
            owner_id: owner,
            contact_id: contact,
            visibility: Visibility::Open,
            allowed_viewers: BTreeSet::new(),
            visible_fields: None,
            hidden_fields: FieldSet::new(),
            price: Money::zero(Currency::Rub),
            description: Some("Met at RustConf".to_string()),
        }
    }

    #[tokio::test]
    async fn first_publish_creates_share_with_deep_link() {
        let fx = Fixture::new();
        let owner = UserId::new();
        let contact = fx.seed_contact(owner);

        let result = handler(&fx).handle(open_command(owner, contact)).await.unwrap();

        assert!(result.created);
        assert!(result.share.is_active);
        assert!(result.deep_link.ends_with(result.share.access_token.as_str()));
        assert!(!result.deep_link.contains(&result.share.id.to_string()));
    }

    #[tokio::test]
    async fn republish_updates_in_place_and_keeps_token() {
        let fx = Fixture::new();
        let owner = UserId::new();
        let contact = fx.seed_contact(owner);
        let handler = handler(&fx);
        let first = handler.handle(open_command(owner, contact)).await.unwrap();

        let mut cmd = open_command(owner, contact);
        cmd.hidden_fields = [ContactField::Company].into_iter().collect();
        let second = handler.handle(cmd).await.unwrap();

        assert!(!second.created);
        assert_eq!(second.share.id, first.share.id);
        assert_eq!(second.share.access_token, first.share.access_token);
        assert!(second.share.hidden_fields.contains(&ContactField::Company));
        assert_eq!(fx.shares.list_by_owner(&owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn paid_without_seller_access_is_rejected() {
        let fx = Fixture::new();
        let owner = UserId::new();
        let contact = fx.seed_contact(owner);
        let mut cmd = open_command(owner, contact);
        cmd.visibility = Visibility::Paid;
        cmd.price = rub(500);

        let err = handler(&fx).handle(cmd).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::SellerAccessRequired);
        assert!(fx.shares.find_active(&owner, &contact).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn priced_restricted_share_needs_seller_access() {
        let fx = Fixture::new();
        let owner = UserId::new();
        let contact = fx.seed_contact(owner);
        let mut cmd = open_command(owner, contact);
        cmd.visibility = Visibility::Restricted;
        cmd.allowed_viewers = [UserId::new()].into_iter().collect();
        cmd.price = rub(500);

        let err = handler(&fx).handle(cmd).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SellerAccessRequired);
    }

    #[tokio::test]
    async fn paid_with_seller_access_is_published() {
        let fx = Fixture::new();
        let owner = UserId::new();
        fx.grant_seller(owner).await;
        let contact = fx.seed_contact(owner);
        let mut cmd = open_command(owner, contact);
        cmd.visibility = Visibility::Paid;
        cmd.price = rub(500);

        let result = handler(&fx).handle(cmd).await.unwrap();
        assert!(result.share.requires_payment());
    }

    #[tokio::test]
    async fn paid_with_zero_price_is_a_validation_error() {
        let fx = Fixture::new();
        let owner = UserId::new();
        fx.grant_seller(owner).await;
        let contact = fx.seed_contact(owner);
        let mut cmd = open_command(owner, contact);
        cmd.visibility = Visibility::Paid;

        let err = handler(&fx).handle(cmd).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn publishing_someone_elses_contact_is_forbidden() {
        let fx = Fixture::new();
        let contact = fx.seed_contact(UserId::new());

        let err = handler(&fx)
            .handle(open_command(UserId::new(), contact))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn unknown_contact_is_not_found() {
        let fx = Fixture::new();
        let err = handler(&fx)
            .handle(open_command(UserId::new(), ContactId::new()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ContactNotFound);
    }
}
