//! Field projection shared by every read path.
//!
//! Browsing previews, deep-link previews and purchase snapshots all go
//! through [`filtered_fields`]; nothing else decides which contact fields a
//! share exposes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::foundation::{ShareId, UserId};

use super::{ContactField, Share};

/// Raw contact attributes keyed by field name.
pub type ContactFields = BTreeMap<String, Value>;

/// Name given to a copied contact that carries no name of its own.
pub const UNNAMED_CONTACT: &str = "Unnamed contact";

/// Returns the contact fields the share exposes.
///
/// A field is kept when it is in the share's visible set, not in its hidden
/// set, and carries a non-empty value. Unknown keys are never exposed.
pub fn filtered_fields(share: &Share, contact: &ContactFields) -> ContactFields {
    let exposed = share.effective_fields();
    contact
        .iter()
        .filter(|(key, value)| {
            key.parse::<ContactField>()
                .map(|field| exposed.contains(&field))
                .unwrap_or(false)
                && has_content(value)
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

/// Where a purchased copy came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub purchased_from_share: ShareId,
    pub purchased_from_user: UserId,
    pub source: String,
}

/// An independent copy of a contact, ready to be written for the buyer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSnapshot {
    pub name: String,
    pub fields: ContactFields,
    pub provenance: Provenance,
}

impl ContactSnapshot {
    /// Projects the contact through the share and stamps provenance.
    pub fn from_share(share: &Share, contact: &ContactFields) -> Self {
        let fields = filtered_fields(share, contact);
        let name = fields
            .get(ContactField::Name.as_str())
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| UNNAMED_CONTACT.to_string());

        Self {
            name,
            fields,
            provenance: Provenance {
                purchased_from_share: share.id,
                purchased_from_user: share.owner_id,
                source: "marketplace".to_string(),
            },
        }
    }

    /// Field map of the buyer's copy: projected fields, name and provenance.
    pub fn stored_fields(&self) -> ContactFields {
        let mut fields = self.fields.clone();
        fields.insert(ContactField::Name.as_str().to_string(), Value::from(self.name.clone()));
        fields.insert(
            "purchased_from_share".to_string(),
            Value::from(self.provenance.purchased_from_share.to_string()),
        );
        fields.insert(
            "purchased_from_user".to_string(),
            Value::from(self.provenance.purchased_from_user.to_string()),
        );
        fields.insert("source".to_string(), Value::from(self.provenance.source.clone()));
        fields
    }
}
