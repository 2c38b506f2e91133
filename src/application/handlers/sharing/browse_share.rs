//! BrowseShareHandler - the preview a viewer sees before acquiring a share.
//!
//! The preview is computed with the same projection the purchase path
//! uses, so what a buyer sees is exactly what they get.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::sharing::{deep_link, filtered_fields, ContactFields, Share, Visibility};
use crate::ports::{ContactStore, IdentityStore, PurchaseRepository, ShareRepository, UserRecord};

use super::ShareLocator;

#[derive(Debug, Clone)]
pub struct BrowseShareQuery {
    pub locator: ShareLocator,
    pub viewer_id: UserId,
}

/// What a viewer is shown.
#[derive(Debug, Clone)]
pub struct BrowseShareResult {
    pub share: Share,
    pub preview: ContactFields,
    /// Viewer is the owner.
    pub is_owner: bool,
    /// Viewer is the owner or already bought the share.
    pub owned: bool,
    /// Paid, priced and not owned by the viewer.
    pub requires_payment: bool,
    pub seller: Option<UserRecord>,
    pub deep_link: String,
}

pub struct BrowseShareHandler {
    shares: Arc<dyn ShareRepository>,
    contacts: Arc<dyn ContactStore>,
    purchases: Arc<dyn PurchaseRepository>,
    identities: Arc<dyn IdentityStore>,
    bot_username: String,
}

impl BrowseShareHandler {
    pub fn new(
        shares: Arc<dyn ShareRepository>,
        contacts: Arc<dyn ContactStore>,
        purchases: Arc<dyn PurchaseRepository>,
        identities: Arc<dyn IdentityStore>,
        bot_username: impl Into<String>,
    ) -> Self {
        Self {
            shares,
            contacts,
            purchases,
            identities,
            bot_username: bot_username.into(),
        }
    }

    pub async fn handle(&self, query: BrowseShareQuery) -> Result<BrowseShareResult, DomainError> {
        let share = query.locator.resolve_active(self.shares.as_ref()).await?;
        let is_owner = share.is_owned_by(&query.viewer_id);

        let purchased = !is_owner
            && self
                .purchases
                .find_by_buyer_and_share(&query.viewer_id, &share.id)
                .await?
                .is_some();

        if share.visibility == Visibility::Restricted && !share.can_view(&query.viewer_id, purchased)
        {
            return Err(DomainError::forbidden("This share is restricted")
                .with_detail("visibility", share.visibility.to_string()));
        }

        let contact = self.contacts.get(&share.contact_id).await?.ok_or_else(|| {
            DomainError::new(ErrorCode::ContactNotFound, "Shared contact no longer exists")
        })?;
        let preview = filtered_fields(&share, &contact.fields);

        if !is_owner {
            // Counter failures must not hide the preview.
            if let Err(e) = self.shares.increment_views(&share.id).await {
                warn!(share_id = %share.id, error = %e, "Failed to count view");
            }
        }

        let seller = self.identities.resolve(&share.owner_id).await?;
        let owned = is_owner || purchased;
        let requires_payment = share.requires_payment() && !owned;

        debug!(share_id = %share.id, owned, requires_payment, "Share browsed");

        let deep_link = deep_link(&self.bot_username, &share.access_token);
        Ok(BrowseShareResult {
            share,
            preview,
            is_owner,
            owned,
            requires_payment,
            seller,
            deep_link,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{rub, Fixture, BOT};
    use crate::domain::foundation::{Currency, Money};
    use crate::domain::sharing::{AccessToken, ShareSettings};
    use std::collections::BTreeSet;

    fn handler(fx: &Fixture) -> BrowseShareHandler {
        BrowseShareHandler::new(
            fx.shares.clone(),
            fx.contacts.clone(),
            fx.purchases.clone(),
            fx.identities.clone(),
            BOT,
        )
    }

    #[tokio::test]
    async fn open_share_preview_shows_only_visible_fields() {
        let fx = Fixture::new();
        let owner = fx.seed_user("Anna");
        let share = fx.seed_share(owner, Visibility::Open, Money::zero(Currency::Rub)).await;

        let result = handler(&fx)
            .handle(BrowseShareQuery {
                locator: ShareLocator::Token(share.access_token.clone()),
                viewer_id: UserId::new(),
            })
            .await
            .unwrap();

        assert_eq!(result.preview.get("company"), Some(&serde_json::json!("Northwind")));
        assert!(!result.preview.contains_key("phone"));
        assert!(!result.requires_payment);
        assert_eq!(result.seller.unwrap().display_name, "Anna");
    }

    #[tokio::test]
    async fn viewer_visits_are_counted_but_owner_visits_are_not() {
        let fx = Fixture::new();
        let owner = UserId::new();
        let share = fx.seed_share(owner, Visibility::Open, Money::zero(Currency::Rub)).await;
        let handler = handler(&fx);

        for viewer in [UserId::new(), UserId::new(), owner] {
            handler
                .handle(BrowseShareQuery { locator: ShareLocator::Id(share.id), viewer_id: viewer })
                .await
                .unwrap();
        }

        let stored = fx.shares.find_by_id(&share.id).await.unwrap().unwrap();
        assert_eq!(stored.view_count, 2);
    }

    #[tokio::test]
    async fn paid_share_flags_payment_for_strangers() {
        let fx = Fixture::new();
        let owner = UserId::new();
        let share = fx.seed_share(owner, Visibility::Paid, rub(500)).await;

        let result = handler(&fx)
            .handle(BrowseShareQuery {
                locator: ShareLocator::Id(share.id),
                viewer_id: UserId::new(),
            })
            .await
            .unwrap();

        assert!(result.requires_payment);
        assert!(!result.owned);
        assert!(!result.preview.is_empty());
    }

    #[tokio::test]
    async fn restricted_share_is_forbidden_to_outsiders_only() {
        let fx = Fixture::new();
        let owner = UserId::new();
        let friend = UserId::new();
        let contact = fx.seed_contact(owner);
        let settings = ShareSettings::new(
            Visibility::Restricted,
            BTreeSet::from([friend]),
            None,
            Default::default(),
            Money::zero(Currency::Rub),
            None,
        )
        .unwrap();
        let share = Share::publish(contact, owner, settings);
        fx.shares.save(&share).await.unwrap();
        let handler = handler(&fx);

        let err = handler
            .handle(BrowseShareQuery { locator: ShareLocator::Id(share.id), viewer_id: UserId::new() })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        assert!(handler
            .handle(BrowseShareQuery { locator: ShareLocator::Id(share.id), viewer_id: friend })
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let fx = Fixture::new();
        let err = handler(&fx)
            .handle(BrowseShareQuery {
                locator: ShareLocator::Token(AccessToken::generate()),
                viewer_id: UserId::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ShareNotFound);
    }
}
