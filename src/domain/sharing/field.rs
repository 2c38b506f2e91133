//! The catalogue of contact fields that may be published.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// A contact attribute that can appear in a share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Name,
    Company,
    Role,
    Phone,
    Email,
    TelegramUsername,
    LinkedinUrl,
    EventName,
    WhatLookingFor,
    CanHelpWith,
    Topics,
    Agreements,
    FollowUpAction,
}

impl ContactField {
    /// Every shareable field.
    pub const ALL: [ContactField; 13] = [
        ContactField::Name,
        ContactField::Company,
        ContactField::Role,
        ContactField::Phone,
        ContactField::Email,
        ContactField::TelegramUsername,
        ContactField::LinkedinUrl,
        ContactField::EventName,
        ContactField::WhatLookingFor,
        ContactField::CanHelpWith,
        ContactField::Topics,
        ContactField::Agreements,
        ContactField::FollowUpAction,
    ];

    /// Fields visible when the owner does not choose any.
    pub const DEFAULT_VISIBLE: [ContactField; 6] = [
        ContactField::Name,
        ContactField::Company,
        ContactField::Role,
        ContactField::WhatLookingFor,
        ContactField::CanHelpWith,
        ContactField::Topics,
    ];

    /// Storage and wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactField::Name => "name",
            ContactField::Company => "company",
            ContactField::Role => "role",
            ContactField::Phone => "phone",
            ContactField::Email => "email",
            ContactField::TelegramUsername => "telegram_username",
            ContactField::LinkedinUrl => "linkedin_url",
            ContactField::EventName => "event_name",
            ContactField::WhatLookingFor => "what_looking_for",
            ContactField::CanHelpWith => "can_help_with",
            ContactField::Topics => "topics",
            ContactField::Agreements => "agreements",
            ContactField::FollowUpAction => "follow_up_action",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContactField::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                ValidationError::invalid_format("fields", format!("'{}' is not a shareable field", s))
            })
    }
}

/// Ordered set of contact fields.
pub type FieldSet = BTreeSet<ContactField>;

/// Parses a list of field names, rejecting anything outside the catalogue.
pub fn parse_field_set<S: AsRef<str>>(names: &[S]) -> Result<FieldSet, ValidationError> {
    names.iter().map(|n| n.as_ref().trim().parse()).collect()
}

/// The default visible set.
pub fn default_visible_fields() -> FieldSet {
    ContactField::DEFAULT_VISIBLE.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for field in ContactField::ALL {
            assert_eq!(field.as_str().parse::<ContactField>().unwrap(), field);
        }
    }

    #[test]
    fn serde_name_matches_as_str() {
        for field in ContactField::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.as_str()));
        }
    }

    #[test]
    fn parse_field_set_rejects_unknown_names() {
        let err = parse_field_set(&["name", "password"]).unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn parse_field_set_deduplicates() {
        let set = parse_field_set(&["name", " name", "company"]).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn default_visible_excludes_contact_channels() {
        let defaults = default_visible_fields();
        assert!(!defaults.contains(&ContactField::Phone));
        assert!(!defaults.contains(&ContactField::Email));
        assert!(defaults.contains(&ContactField::Name));
    }
}
