//! Provider-neutral webhook events.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::payment::PaymentStatus;

/// What happened at the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderEventKind {
    PaymentSucceeded,
    PaymentCanceled,
    RefundSucceeded,
    /// Anything we acknowledge without acting on, e.g. `payment.waiting_for_capture`.
    Other(String),
}

impl ProviderEventKind {
    /// Maps a provider event name to a kind.
    pub fn from_event_name(name: &str) -> Self {
        match name {
            "payment.succeeded" => ProviderEventKind::PaymentSucceeded,
            "payment.canceled" | "payment.cancelled" => ProviderEventKind::PaymentCanceled,
            "refund.succeeded" => ProviderEventKind::RefundSucceeded,
            other => ProviderEventKind::Other(other.to_string()),
        }
    }

    /// Ledger status this event drives the payment to.
    pub fn target_status(&self) -> Option<PaymentStatus> {
        match self {
            ProviderEventKind::PaymentSucceeded => Some(PaymentStatus::Succeeded),
            ProviderEventKind::PaymentCanceled => Some(PaymentStatus::Cancelled),
            ProviderEventKind::RefundSucceeded => Some(PaymentStatus::Refunded),
            ProviderEventKind::Other(_) => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ProviderEventKind::PaymentSucceeded => "payment.succeeded",
            ProviderEventKind::PaymentCanceled => "payment.canceled",
            ProviderEventKind::RefundSucceeded => "refund.succeeded",
            ProviderEventKind::Other(name) => name,
        }
    }
}

/// A parsed webhook delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderEvent {
    pub kind: ProviderEventKind,

    /// Provider's payment identifier, as stored on the intent.
    pub correlation_id: String,

    /// Provider object, stored on the intent for audit.
    pub payload: Value,
}

impl ProviderEvent {
    pub fn new(kind: ProviderEventKind, correlation_id: impl Into<String>, payload: Value) -> Self {
        Self {
            kind,
            correlation_id: correlation_id.into(),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_event_names_map_to_statuses() {
        assert_eq!(
            ProviderEventKind::from_event_name("payment.succeeded").target_status(),
            Some(PaymentStatus::Succeeded)
        );
        assert_eq!(
            ProviderEventKind::from_event_name("payment.canceled").target_status(),
            Some(PaymentStatus::Cancelled)
        );
        assert_eq!(
            ProviderEventKind::from_event_name("refund.succeeded").target_status(),
            Some(PaymentStatus::Refunded)
        );
    }

    #[test]
    fn unknown_event_names_have_no_target() {
        let kind = ProviderEventKind::from_event_name("payment.waiting_for_capture");
        assert_eq!(kind.target_status(), None);
        assert_eq!(kind.name(), "payment.waiting_for_capture");
    }
}
