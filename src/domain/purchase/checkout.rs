//! Checkout sessions.
//!
//! A session remembers which pending payment a buyer is completing for a
//! given target, so a repeated "buy" click reuses the same provider page and
//! webhook completion never depends on client-side state.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CheckoutSessionId, PaymentId, ShareId, Timestamp, UserId, ValidationError,
};

/// What a checkout is buying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckoutTarget {
    Share { share_id: ShareId },
    Subscription,
}

impl CheckoutTarget {
    /// Stable storage key, e.g. `share:<uuid>` or `subscription`.
    pub fn key(&self) -> String {
        match self {
            CheckoutTarget::Share { share_id } => format!("share:{}", share_id),
            CheckoutTarget::Subscription => "subscription".to_string(),
        }
    }

    /// Inverse of [`key`](Self::key).
    pub fn from_key(key: &str) -> Result<Self, ValidationError> {
        if key == "subscription" {
            return Ok(CheckoutTarget::Subscription);
        }
        key.strip_prefix("share:")
            .and_then(|id| id.parse::<ShareId>().ok())
            .map(|share_id| CheckoutTarget::Share { share_id })
            .ok_or_else(|| ValidationError::invalid_format("checkout_target", key))
    }
}

/// Short-lived link from (buyer, target) to a pending payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: CheckoutSessionId,
    pub buyer_id: UserId,
    pub target: CheckoutTarget,
    pub payment_id: PaymentId,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl CheckoutSession {
    pub fn start(
        buyer_id: UserId,
        target: CheckoutTarget,
        payment_id: PaymentId,
        now: Timestamp,
        ttl_secs: i64,
    ) -> Self {
        Self {
            id: CheckoutSessionId::new(),
            buyer_id,
            target,
            payment_id,
            created_at: now,
            expires_at: now.plus_secs(ttl_secs),
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        !now.is_before(&self.expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_keys_are_stable() {
        let id = ShareId::new();
        assert_eq!(CheckoutTarget::Share { share_id: id }.key(), format!("share:{}", id));
        assert_eq!(CheckoutTarget::Subscription.key(), "subscription");
    }

    #[test]
    fn keys_parse_back_to_targets() {
        let target = CheckoutTarget::Share { share_id: ShareId::new() };
        assert_eq!(CheckoutTarget::from_key(&target.key()).unwrap(), target);
        assert_eq!(
            CheckoutTarget::from_key("subscription").unwrap(),
            CheckoutTarget::Subscription
        );
        assert!(CheckoutTarget::from_key("share:nope").is_err());
    }

    #[test]
    fn session_expires_after_ttl() {
        let now = Timestamp::now();
        let session =
            CheckoutSession::start(UserId::new(), CheckoutTarget::Subscription, PaymentId::new(), now, 60);
        assert!(!session.is_expired(now.plus_secs(59)));
        assert!(session.is_expired(now.plus_secs(60)));
    }
}
