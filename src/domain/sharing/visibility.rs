//! Share visibility policy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Who may see a published contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Anyone with the link or the catalogue.
    Open,

    /// Only the owner and an explicit allow-list.
    Restricted,

    /// Anyone may preview; the copy requires a completed purchase.
    Paid,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Open => "open",
            Visibility::Restricted => "restricted",
            Visibility::Paid => "paid",
        }
    }

    /// Whether the share is listed in the public catalogue.
    pub fn is_listed(&self) -> bool {
        matches!(self, Visibility::Open | Visibility::Paid)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = ValidationError;

    /// Accepts the legacy `public`/`private` spellings as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" | "public" => Ok(Visibility::Open),
            "restricted" | "private" => Ok(Visibility::Restricted),
            "paid" => Ok(Visibility::Paid),
            other => Err(ValidationError::invalid_format(
                "visibility",
                format!("unknown visibility '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_and_legacy_names() {
        assert_eq!("open".parse::<Visibility>().unwrap(), Visibility::Open);
        assert_eq!("public".parse::<Visibility>().unwrap(), Visibility::Open);
        assert_eq!("private".parse::<Visibility>().unwrap(), Visibility::Restricted);
        assert_eq!("paid".parse::<Visibility>().unwrap(), Visibility::Paid);
    }

    #[test]
    fn rejects_unknown_visibility() {
        assert!("secret".parse::<Visibility>().is_err());
    }

    #[test]
    fn restricted_shares_are_not_listed() {
        assert!(Visibility::Open.is_listed());
        assert!(Visibility::Paid.is_listed());
        assert!(!Visibility::Restricted.is_listed());
    }
}
