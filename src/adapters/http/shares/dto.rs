//! Share request and response bodies.
//!
//! Only owner-facing responses carry the share id; everyone else gets the
//! access token as the public handle.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::handlers::sharing::BrowseShareResult;
use crate::domain::sharing::{deep_link, ContactField, ContactFields, Share, Visibility};

use super::super::dto::{iso, MoneyDto};

/// Body of `POST /shares`.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishShareRequest {
    pub contact_id: Uuid,
    pub visibility: Visibility,
    #[serde(default)]
    pub allowed_viewers: Vec<Uuid>,
    /// Omitted selects the default set; empty selects every field.
    #[serde(default)]
    pub visible_fields: Option<Vec<String>>,
    #[serde(default)]
    pub hidden_fields: Vec<String>,
    /// Decimal amount such as `"500"` or `"499.90"`.
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `PATCH /shares/:id/fields`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateFieldsRequest {
    #[serde(default)]
    pub visible_fields: Option<Vec<String>>,
    #[serde(default)]
    pub hidden_fields: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogueParams {
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: u32,
}

/// Full share, as its owner sees it.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerShareResponse {
    pub id: String,
    pub contact_id: String,
    pub access_token: String,
    pub deep_link: String,
    pub visibility: Visibility,
    pub allowed_viewers: Vec<String>,
    pub visible_fields: Vec<ContactField>,
    pub hidden_fields: Vec<ContactField>,
    pub price: MoneyDto,
    pub description: Option<String>,
    pub is_active: bool,
    pub view_count: i64,
    pub purchase_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl OwnerShareResponse {
    pub fn new(share: &Share, bot_username: &str) -> Self {
        Self {
            id: share.id.to_string(),
            contact_id: share.contact_id.to_string(),
            access_token: share.access_token.to_string(),
            deep_link: deep_link(bot_username, &share.access_token),
            visibility: share.visibility,
            allowed_viewers: share.allowed_viewers.iter().map(ToString::to_string).collect(),
            visible_fields: share.visible_fields.iter().copied().collect(),
            hidden_fields: share.hidden_fields.iter().copied().collect(),
            price: share.price.into(),
            description: share.description.clone(),
            is_active: share.is_active,
            view_count: share.view_count,
            purchase_count: share.purchase_count,
            created_at: iso(&share.created_at),
            updated_at: iso(&share.updated_at),
        }
    }
}

/// Result of a publish: the owner view plus whether a new share was made.
#[derive(Debug, Clone, Serialize)]
pub struct PublishShareResponse {
    #[serde(flatten)]
    pub share: OwnerShareResponse,
    pub created: bool,
}

/// Catalogue entry.
#[derive(Debug, Clone, Serialize)]
pub struct ShareCard {
    pub access_token: String,
    pub deep_link: String,
    pub visibility: Visibility,
    pub fields: Vec<ContactField>,
    pub price: MoneyDto,
    pub description: Option<String>,
    pub purchase_count: i64,
    pub created_at: String,
}

impl ShareCard {
    pub fn new(share: &Share, bot_username: &str) -> Self {
        Self {
            access_token: share.access_token.to_string(),
            deep_link: deep_link(bot_username, &share.access_token),
            visibility: share.visibility,
            fields: share.effective_fields().into_iter().collect(),
            price: share.price.into(),
            description: share.description.clone(),
            purchase_count: share.purchase_count,
            created_at: iso(&share.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SellerDto {
    pub display_name: String,
    pub username: Option<String>,
}

/// What a viewer sees when opening a share.
#[derive(Debug, Clone, Serialize)]
pub struct BrowseShareResponse {
    /// Present for the owner only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_id: Option<String>,
    pub access_token: String,
    pub deep_link: String,
    pub visibility: Visibility,
    pub preview: ContactFields,
    pub price: MoneyDto,
    pub description: Option<String>,
    pub is_owner: bool,
    pub owned: bool,
    pub requires_payment: bool,
    pub seller: Option<SellerDto>,
}

impl From<BrowseShareResult> for BrowseShareResponse {
    fn from(result: BrowseShareResult) -> Self {
        let share = result.share;
        Self {
            share_id: result.is_owner.then(|| share.id.to_string()),
            access_token: share.access_token.to_string(),
            deep_link: result.deep_link,
            visibility: share.visibility,
            preview: result.preview,
            price: share.price.into(),
            description: share.description,
            is_owner: result.is_owner,
            owned: result.owned,
            requires_payment: result.requires_payment,
            seller: result.seller.map(|user| SellerDto {
                display_name: user.display_name,
                username: user.username,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ContactId, Currency, Money, UserId};
    use crate::domain::sharing::ShareSettings;

    fn paid_share() -> Share {
        let settings = ShareSettings::new(
            Visibility::Paid,
            Default::default(),
            None,
            Default::default(),
            Money::from_minor(50_000, Currency::Rub).unwrap(),
            Some("Fintech founder".into()),
        )
        .unwrap();
        Share::publish(ContactId::new(), UserId::new(), settings)
    }

    fn browse(share: Share, is_owner: bool) -> BrowseShareResult {
        BrowseShareResult {
            deep_link: deep_link("exchange_bot", &share.access_token),
            share,
            preview: ContactFields::new(),
            is_owner,
            owned: is_owner,
            requires_payment: !is_owner,
            seller: None,
        }
    }

    #[test]
    fn catalogue_card_never_carries_the_id() {
        let share = paid_share();
        let json = serde_json::to_value(ShareCard::new(&share, "exchange_bot")).unwrap();
        assert!(json.get("id").is_none());
        assert!(!json.to_string().contains(&share.id.to_string()));
        assert_eq!(json["price"]["amount"], "500.00");
    }

    #[test]
    fn browse_hides_id_from_non_owners() {
        let share = paid_share();
        let id = share.id.to_string();

        let viewer = serde_json::to_value(BrowseShareResponse::from(browse(share.clone(), false))).unwrap();
        assert!(viewer.get("share_id").is_none());
        assert!(!viewer.to_string().contains(&id));

        let owner = serde_json::to_value(BrowseShareResponse::from(browse(share, true))).unwrap();
        assert_eq!(owner["share_id"], id);
    }

    #[test]
    fn publish_request_defaults() {
        let req: PublishShareRequest = serde_json::from_value(serde_json::json!({
            "contact_id": Uuid::new_v4(),
            "visibility": "open"
        }))
        .unwrap();
        assert!(req.visible_fields.is_none());
        assert!(req.hidden_fields.is_empty());
        assert!(req.price.is_none());
    }
}
