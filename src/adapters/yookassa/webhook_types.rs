//! YooKassa-specific types.
//!
//! These mirror the JSON YooKassa sends in API responses and HTTP
//! notifications, and map them onto provider-neutral events.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::webhook::{ProviderEvent, ProviderEventKind, WebhookError};

/// Header carrying the hex HMAC-SHA256 of the notification body.
pub const SIGNATURE_HEADER: &str = "x-yookassa-signature";

/// An HTTP notification: `{"type": "notification", "event": ..., "object": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct YooKassaNotification {
    pub event: String,
    pub object: Value,
}

impl YooKassaNotification {
    pub fn parse(body: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(body).map_err(|e| WebhookError::ParseError(e.to_string()))
    }

    /// Converts the notification into a provider event.
    ///
    /// Refund objects reference their payment through `payment_id`; the
    /// payment's own id is the fallback.
    pub fn into_event(self) -> Result<ProviderEvent, WebhookError> {
        let kind = ProviderEventKind::from_event_name(&self.event);
        let object_id = |key: &str| {
            self.object
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let correlation_id = match kind {
            ProviderEventKind::RefundSucceeded => object_id("payment_id").or_else(|| object_id("id")),
            _ => object_id("id"),
        }
        .ok_or(WebhookError::MissingField("object.id"))?;

        Ok(ProviderEvent::new(kind, correlation_id, self.object))
    }
}

/// Payment object returned by `POST /v3/payments` and `GET /v3/payments/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentObject {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub confirmation: Option<Confirmation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Confirmation {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub confirmation_url: Option<String>,
}

impl PaymentObject {
    /// Event equivalent of the payment's current status, if final.
    pub fn status_event(&self) -> Option<ProviderEventKind> {
        match self.status.as_str() {
            "succeeded" => Some(ProviderEventKind::PaymentSucceeded),
            "canceled" => Some(ProviderEventKind::PaymentCanceled),
            _ => None,
        }
    }
}

/// Error body YooKassa returns on 4xx/5xx.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn payment_notification_uses_object_id() {
        let raw = body(json!({
            "type": "notification",
            "event": "payment.succeeded",
            "object": {"id": "2c7a-0001", "status": "succeeded"}
        }));
        let event = YooKassaNotification::parse(&raw).unwrap().into_event().unwrap();
        assert_eq!(event.kind, ProviderEventKind::PaymentSucceeded);
        assert_eq!(event.correlation_id, "2c7a-0001");
    }

    #[test]
    fn refund_notification_points_at_payment() {
        let raw = body(json!({
            "event": "refund.succeeded",
            "object": {"id": "refund-9", "payment_id": "2c7a-0001"}
        }));
        let event = YooKassaNotification::parse(&raw).unwrap().into_event().unwrap();
        assert_eq!(event.kind, ProviderEventKind::RefundSucceeded);
        assert_eq!(event.correlation_id, "2c7a-0001");
    }

    #[test]
    fn refund_without_payment_id_falls_back_to_id() {
        let raw = body(json!({"event": "refund.succeeded", "object": {"id": "refund-9"}}));
        let event = YooKassaNotification::parse(&raw).unwrap().into_event().unwrap();
        assert_eq!(event.correlation_id, "refund-9");
    }

    #[test]
    fn missing_object_id_is_rejected() {
        let raw = body(json!({"event": "payment.succeeded", "object": {}}));
        let err = YooKassaNotification::parse(&raw).unwrap().into_event().unwrap_err();
        assert!(matches!(err, WebhookError::MissingField("object.id")));
    }

    #[test]
    fn garbage_is_parse_error() {
        assert!(matches!(
            YooKassaNotification::parse(b"{"),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn pending_payment_has_no_status_event() {
        let payment: PaymentObject =
            serde_json::from_value(json!({"id": "p", "status": "pending"})).unwrap();
        assert_eq!(payment.status_event(), None);
        let payment: PaymentObject =
            serde_json::from_value(json!({"id": "p", "status": "canceled"})).unwrap();
        assert_eq!(payment.status_event(), Some(ProviderEventKind::PaymentCanceled));
    }
}
