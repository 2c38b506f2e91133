//! Telegram update types.
//!
//! Only the fields that matter for Stars payments are modelled; everything
//! else in an update is ignored by serde.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::PaymentId;
use crate::domain::webhook::{ProviderEvent, ProviderEventKind, WebhookError};

const PAYLOAD_PREFIX: &str = "intent_";

/// Invoice payload for an intent; it doubles as the correlation id.
pub fn invoice_payload_for(payment_id: &PaymentId) -> String {
    format!("{}{}", PAYLOAD_PREFIX, payment_id)
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub pre_checkout_query: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub successful_payment: Option<StarsPayment>,
    #[serde(default)]
    pub refunded_payment: Option<StarsPayment>,
}

/// Body of `successful_payment` and `refunded_payment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarsPayment {
    pub currency: String,
    pub total_amount: i64,
    pub invoice_payload: String,
    #[serde(default)]
    pub telegram_payment_charge_id: Option<String>,
}

impl TelegramUpdate {
    pub fn parse(body: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(body).map_err(|e| WebhookError::ParseError(e.to_string()))
    }

    /// The payment event this update carries, if any.
    ///
    /// Pre-checkout queries and ordinary messages yield `None`.
    pub fn into_event(self) -> Result<Option<ProviderEvent>, WebhookError> {
        let Some(message) = self.message else {
            return Ok(None);
        };

        let (kind, payment) = match (message.successful_payment, message.refunded_payment) {
            (Some(payment), _) => (ProviderEventKind::PaymentSucceeded, payment),
            (None, Some(payment)) => (ProviderEventKind::RefundSucceeded, payment),
            (None, None) => return Ok(None),
        };

        if payment.invoice_payload.is_empty() {
            return Err(WebhookError::MissingField("invoice_payload"));
        }
        let payload = serde_json::to_value(&payment)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        Ok(Some(ProviderEvent::new(kind, payment.invoice_payload, payload)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<Option<ProviderEvent>, WebhookError> {
        TelegramUpdate::parse(&serde_json::to_vec(&value).unwrap())?.into_event()
    }

    #[test]
    fn successful_payment_becomes_success_event() {
        let event = parse(json!({
            "update_id": 10,
            "message": {
                "message_id": 5,
                "successful_payment": {
                    "currency": "XTR",
                    "total_amount": 250,
                    "invoice_payload": "intent_abc",
                    "telegram_payment_charge_id": "ch_1"
                }
            }
        }))
        .unwrap()
        .unwrap();

        assert_eq!(event.kind, ProviderEventKind::PaymentSucceeded);
        assert_eq!(event.correlation_id, "intent_abc");
        assert_eq!(event.payload["total_amount"], 250);
    }

    #[test]
    fn refunded_payment_becomes_refund_event() {
        let event = parse(json!({
            "update_id": 11,
            "message": {
                "refunded_payment": {
                    "currency": "XTR",
                    "total_amount": 250,
                    "invoice_payload": "intent_abc"
                }
            }
        }))
        .unwrap()
        .unwrap();
        assert_eq!(event.kind, ProviderEventKind::RefundSucceeded);
    }

    #[test]
    fn pre_checkout_and_chat_messages_are_ignored() {
        let pre_checkout = json!({
            "update_id": 12,
            "pre_checkout_query": {"id": "q1", "invoice_payload": "intent_abc"}
        });
        assert!(parse(pre_checkout).unwrap().is_none());

        let chat = json!({"update_id": 13, "message": {"text": "/start share_tok"}});
        assert!(parse(chat).unwrap().is_none());
    }

    #[test]
    fn empty_payload_is_rejected() {
        let err = parse(json!({
            "update_id": 14,
            "message": {"successful_payment": {"currency": "XTR", "total_amount": 1, "invoice_payload": ""}}
        }))
        .unwrap_err();
        assert!(matches!(err, WebhookError::MissingField("invoice_payload")));
    }

    #[test]
    fn payload_embeds_intent_id() {
        let id = PaymentId::new();
        assert_eq!(invoice_payload_for(&id), format!("intent_{}", id));
    }
}
