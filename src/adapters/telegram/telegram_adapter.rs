//! Telegram Stars adapter.
//!
//! Checkout creates an invoice link priced in XTR. Payment confirmation
//! arrives as a bot update carrying `successful_payment`; the invoice
//! payload is the correlation id. The Bot API has no payment lookup, so
//! status polls are unsupported.

use async_trait::async_trait;
use http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::domain::foundation::Currency;
use crate::domain::payment::Provider;
use crate::domain::webhook::{secret_token_matches, ProviderEvent, WebhookError};
use crate::ports::{CheckoutRequest, PaymentError, PaymentProvider, ProviderCheckout};

use super::update_types::{invoice_payload_for, TelegramUpdate};

/// Header Telegram sets to the `secret_token` given to `setWebhook`.
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";
const INVOICE_TITLE: &str = "Contact exchange";

#[derive(Clone)]
pub struct TelegramStarsConfig {
    bot_token: SecretString,
    webhook_secret_token: Option<SecretString>,
    api_base_url: String,
}

impl TelegramStarsConfig {
    pub fn new(bot_token: SecretString) -> Self {
        Self {
            bot_token,
            webhook_secret_token: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    pub fn with_webhook_secret_token(mut self, token: SecretString) -> Self {
        self.webhook_secret_token = Some(token);
        self
    }

    /// Set a custom Bot API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Bot API envelope: `{"ok": true, "result": ...}` or `{"ok": false, "description": ...}`.
#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

pub struct TelegramStarsAdapter {
    config: TelegramStarsConfig,
    http_client: reqwest::Client,
}

impl TelegramStarsAdapter {
    pub fn new(config: TelegramStarsConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn invoice_body(request: &CheckoutRequest) -> Result<Value, PaymentError> {
        if request.amount.currency != Currency::Xtr {
            return Err(PaymentError::provider(format!(
                "Telegram Stars invoices must be priced in XTR, got {}",
                request.amount.currency.code()
            )));
        }
        Ok(json!({
            "title": INVOICE_TITLE,
            "description": request.description,
            "payload": invoice_payload_for(&request.payment_id),
            "currency": Currency::Xtr.code(),
            "prices": [{"label": request.purpose.as_str(), "amount": request.amount.minor}],
        }))
    }

    fn check_secret_token(&self, headers: &HeaderMap) -> Result<(), WebhookError> {
        let Some(expected) = &self.config.webhook_secret_token else {
            return Ok(());
        };
        let provided = headers
            .get(SECRET_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(WebhookError::MissingSignature)?;

        if secret_token_matches(expected.expose_secret(), provided) {
            Ok(())
        } else {
            warn!("Telegram update with wrong secret token");
            Err(WebhookError::InvalidSignature)
        }
    }
}

#[async_trait]
impl PaymentProvider for TelegramStarsAdapter {
    fn provider(&self) -> Provider {
        Provider::Telegram
    }

    async fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<ProviderCheckout, PaymentError> {
        let body = Self::invoice_body(&request)?;
        let url = format!(
            "{}/bot{}/createInvoiceLink",
            self.config.api_base_url,
            self.config.bot_token.expose_secret()
        );

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.without_url().to_string()))?;

        let envelope: BotApiResponse = response.json().await.map_err(|e| {
            PaymentError::invalid_response(format!("Failed to parse Bot API response: {}", e))
        })?;

        if !envelope.ok {
            let message = envelope
                .description
                .unwrap_or_else(|| "createInvoiceLink failed".to_string());
            error!(error = %message, "Telegram createInvoiceLink failed");
            let mut err = PaymentError::provider(message);
            if let Some(code) = envelope.error_code {
                err = err.with_provider_code(code.to_string());
            }
            return Err(err);
        }

        let confirmation_url = envelope
            .result
            .as_ref()
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| PaymentError::invalid_response("createInvoiceLink returned no link"))?;

        Ok(ProviderCheckout {
            correlation_id: invoice_payload_for(&request.payment_id),
            confirmation_url,
            raw: body,
        })
    }

    async fn fetch_payment(
        &self,
        _correlation_id: &str,
    ) -> Result<Option<ProviderEvent>, PaymentError> {
        Err(PaymentError::unsupported(
            "Telegram Stars payments cannot be polled",
        ))
    }

    fn parse_webhook(
        &self,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Option<ProviderEvent>, WebhookError> {
        self.check_secret_token(headers)?;
        TelegramUpdate::parse(body)?.into_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Money, PaymentId, UserId};
    use crate::domain::payment::PaymentPurpose;
    use crate::domain::webhook::ProviderEventKind;

    const UPDATE: &[u8] = br#"{"update_id":1,"message":{"successful_payment":{"currency":"XTR","total_amount":250,"invoice_payload":"intent_x"}}}"#;

    fn adapter(secret: Option<&str>) -> TelegramStarsAdapter {
        let mut config = TelegramStarsConfig::new(SecretString::new("123:abc".to_string()));
        if let Some(secret) = secret {
            config = config.with_webhook_secret_token(SecretString::new(secret.to_string()));
        }
        TelegramStarsAdapter::new(config)
    }

    fn request(amount: Money) -> CheckoutRequest {
        CheckoutRequest {
            payment_id: PaymentId::new(),
            payer_id: UserId::new(),
            purpose: PaymentPurpose::ContactPurchase,
            amount,
            description: "Contact purchase".into(),
        }
    }

    #[test]
    fn invoice_is_priced_in_stars() {
        let req = request(Money::from_minor(250, Currency::Xtr).unwrap());
        let body = TelegramStarsAdapter::invoice_body(&req).unwrap();

        assert_eq!(body["currency"], "XTR");
        assert_eq!(body["prices"][0]["amount"], 250);
        assert_eq!(body["payload"], invoice_payload_for(&req.payment_id));
    }

    #[test]
    fn rouble_amounts_are_refused() {
        let req = request(Money::from_minor(50_000, Currency::Rub).unwrap());
        assert!(TelegramStarsAdapter::invoice_body(&req).is_err());
    }

    #[tokio::test]
    async fn status_poll_is_unsupported() {
        let err = adapter(None).fetch_payment("intent_x").await.unwrap_err();
        assert_eq!(err.code, crate::ports::PaymentErrorCode::Unsupported);
    }

    #[test]
    fn secret_token_is_enforced() {
        let tg = adapter(Some("hook-secret"));
        assert!(matches!(
            tg.parse_webhook(&HeaderMap::new(), UPDATE),
            Err(WebhookError::MissingSignature)
        ));

        let mut headers = HeaderMap::new();
        headers.insert(SECRET_TOKEN_HEADER, "wrong".parse().unwrap());
        assert!(matches!(
            tg.parse_webhook(&headers, UPDATE),
            Err(WebhookError::InvalidSignature)
        ));

        let mut headers = HeaderMap::new();
        headers.insert(SECRET_TOKEN_HEADER, "hook-secret".parse().unwrap());
        let event = tg.parse_webhook(&headers, UPDATE).unwrap().unwrap();
        assert_eq!(event.kind, ProviderEventKind::PaymentSucceeded);
        assert_eq!(event.correlation_id, "intent_x");
    }
}
