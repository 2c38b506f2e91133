//! Strongly-typed identifier value objects.
//!
//! Every aggregate is keyed by a UUID wrapped in its own newtype so that a
//! `ShareId` can never be passed where a `ContactId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a user (owner, buyer, seller or payer).
    UserId
);

uuid_id!(
    /// Identifier of a contact record held by the contact store.
    ContactId
);

uuid_id!(
    /// Identifier of a published share.
    ShareId
);

uuid_id!(
    /// Identifier of a payment intent in the settlement ledger.
    PaymentId
);

uuid_id!(
    /// Identifier of a completed purchase.
    PurchaseId
);

uuid_id!(
    /// Identifier of a seller subscription.
    SubscriptionId
);

uuid_id!(
    /// Identifier of a checkout session.
    CheckoutSessionId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(ShareId::new(), ShareId::new());
    }

    #[test]
    fn id_parses_from_string() {
        let uuid = Uuid::new_v4();
        let id: PaymentId = uuid.to_string().parse().unwrap();
        assert_eq!(id.as_uuid(), &uuid);
    }

    #[test]
    fn id_rejects_garbage() {
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }

    #[test]
    fn id_serializes_transparently() {
        let uuid = Uuid::new_v4();
        let id = ContactId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }

    #[test]
    fn id_displays_inner_uuid() {
        let uuid = Uuid::new_v4();
        assert_eq!(PurchaseId::from(uuid).to_string(), uuid.to_string());
    }
}
