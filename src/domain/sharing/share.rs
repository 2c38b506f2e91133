//! Share aggregate: one active publication of a contact by its owner.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::{
    ContactId, DomainError, ErrorCode, Money, ShareId, Timestamp, UserId, ValidationError,
};

use super::{default_visible_fields, AccessToken, ContactField, FieldSet, Visibility};

/// Longest description kept on a share, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Owner-chosen publish configuration, validated as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareSettings {
    pub visibility: Visibility,
    pub allowed_viewers: BTreeSet<UserId>,
    pub visible_fields: FieldSet,
    pub hidden_fields: FieldSet,
    pub price: Money,
    pub description: Option<String>,
}

impl ShareSettings {
    /// Validates and normalises publish parameters.
    ///
    /// `visible_fields = None` selects the default set; an explicitly empty
    /// set means every shareable field.
    pub fn new(
        visibility: Visibility,
        allowed_viewers: BTreeSet<UserId>,
        visible_fields: Option<FieldSet>,
        hidden_fields: FieldSet,
        price: Money,
        description: Option<String>,
    ) -> Result<Self, ValidationError> {
        if visibility == Visibility::Paid && price.is_zero() {
            return Err(ValidationError::invalid_format(
                "price",
                "paid shares need a price above zero",
            ));
        }

        Ok(Self {
            visibility,
            allowed_viewers: if visibility == Visibility::Restricted {
                allowed_viewers
            } else {
                BTreeSet::new()
            },
            visible_fields: resolve_visible(visible_fields),
            hidden_fields,
            price,
            description: normalise_description(description),
        })
    }

    /// Payment is waived only for Open shares and zero prices.
    pub fn requires_payment(&self) -> bool {
        charges_for_copy(self.visibility, &self.price)
    }
}

fn charges_for_copy(visibility: Visibility, price: &Money) -> bool {
    visibility != Visibility::Open && !price.is_zero()
}

fn resolve_visible(fields: Option<FieldSet>) -> FieldSet {
    match fields {
        None => default_visible_fields(),
        Some(set) if set.is_empty() => ContactField::ALL.iter().copied().collect(),
        Some(set) => set,
    }
}

fn normalise_description(description: Option<String>) -> Option<String> {
    let text = description?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_DESCRIPTION_CHARS).collect())
}

/// A published, access-controlled projection of one contact.
///
/// # Invariants
///
/// - at most one active share per (contact, owner), enforced by storage
/// - `access_token` is never changed after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub id: ShareId,
    pub contact_id: ContactId,
    pub owner_id: UserId,
    pub visibility: Visibility,
    /// Only consulted when `visibility` is Restricted.
    pub allowed_viewers: BTreeSet<UserId>,
    pub visible_fields: FieldSet,
    /// Explicit overrides; take precedence over `visible_fields`.
    pub hidden_fields: FieldSet,
    pub price: Money,
    pub description: Option<String>,
    pub access_token: AccessToken,
    pub is_active: bool,
    pub view_count: i64,
    pub purchase_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Share {
    /// Creates a new active share with a freshly generated token.
    pub fn publish(contact_id: ContactId, owner_id: UserId, settings: ShareSettings) -> Self {
        let now = Timestamp::now();
        Self {
            id: ShareId::new(),
            contact_id,
            owner_id,
            visibility: settings.visibility,
            allowed_viewers: settings.allowed_viewers,
            visible_fields: settings.visible_fields,
            hidden_fields: settings.hidden_fields,
            price: settings.price,
            description: settings.description,
            access_token: AccessToken::generate(),
            is_active: true,
            view_count: 0,
            purchase_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the publish configuration in place. The token is kept.
    pub fn reconfigure(&mut self, settings: ShareSettings) {
        self.visibility = settings.visibility;
        self.allowed_viewers = settings.allowed_viewers;
        self.visible_fields = settings.visible_fields;
        self.hidden_fields = settings.hidden_fields;
        self.price = settings.price;
        self.description = settings.description;
        self.updated_at = Timestamp::now();
    }

    /// Changes only which fields are shown.
    pub fn update_field_visibility(
        &mut self,
        caller: &UserId,
        visible_fields: Option<FieldSet>,
        hidden_fields: FieldSet,
    ) -> Result<(), DomainError> {
        self.ensure_owner(caller)?;
        self.visible_fields = resolve_visible(visible_fields);
        self.hidden_fields = hidden_fields;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Soft-deletes the share. Deactivating twice is harmless.
    pub fn deactivate(&mut self, caller: &UserId) -> Result<(), DomainError> {
        self.ensure_owner(caller)?;
        if self.is_active {
            self.is_active = false;
            self.updated_at = Timestamp::now();
        }
        Ok(())
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner_id == user
    }

    /// True when acquiring a copy needs a settled payment.
    pub fn requires_payment(&self) -> bool {
        charges_for_copy(self.visibility, &self.price)
    }

    /// Fields actually exposed: visible minus hidden.
    pub fn effective_fields(&self) -> FieldSet {
        self.visible_fields
            .difference(&self.hidden_fields)
            .copied()
            .collect()
    }

    /// Access check for a viewer, given whether they already bought it.
    pub fn can_view(&self, viewer: &UserId, has_purchased: bool) -> bool {
        if self.is_owned_by(viewer) {
            return true;
        }
        match self.visibility {
            Visibility::Open => true,
            Visibility::Restricted => self.allowed_viewers.contains(viewer),
            Visibility::Paid => has_purchased,
        }
    }

    fn ensure_owner(&self, caller: &UserId) -> Result<(), DomainError> {
        if self.is_owned_by(caller) {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "Only the owner can change this share",
            )
            .with_detail("share_id", self.id.to_string()))
        }
    }
}
