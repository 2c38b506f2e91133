//! YooKassa payment provider adapter.
//!
//! Implements the `PaymentProvider` trait over the YooKassa v3 API.
//!
//! # Security
//!
//! - Shop credentials are held as `secrecy::SecretString`
//! - Checkout creation sends the intent id as `Idempotence-Key`, so a retried
//!   call never creates a second payment
//! - When a webhook secret is configured, notifications must carry a valid
//!   `X-YooKassa-Signature`, compared in constant time
//!
//! # Configuration
//!
//! ```ignore
//! let config = YooKassaConfig::new(shop_id, secret_key, return_url);
//! let adapter = YooKassaPaymentAdapter::new(config);
//! ```

use async_trait::async_trait;
use http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::domain::webhook::{HmacBodyVerifier, ProviderEvent, WebhookError};
use crate::domain::payment::Provider;
use crate::ports::{
    CheckoutRequest, PaymentError, PaymentErrorCode, PaymentProvider, ProviderCheckout,
};

use super::webhook_types::{ApiErrorBody, PaymentObject, YooKassaNotification, SIGNATURE_HEADER};

const DEFAULT_API_BASE_URL: &str = "https://api.yookassa.ru";

/// YooKassa shop configuration.
#[derive(Clone)]
pub struct YooKassaConfig {
    shop_id: String,
    secret_key: SecretString,

    /// Page the payer returns to after confirming.
    return_url: String,

    /// Notification signing secret; `None` accepts unsigned notifications.
    webhook_secret: Option<SecretString>,

    api_base_url: String,
}

impl YooKassaConfig {
    pub fn new(
        shop_id: impl Into<String>,
        secret_key: SecretString,
        return_url: impl Into<String>,
    ) -> Self {
        Self {
            shop_id: shop_id.into(),
            secret_key,
            return_url: return_url.into(),
            webhook_secret: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    pub fn with_webhook_secret(mut self, secret: SecretString) -> Self {
        self.webhook_secret = Some(secret);
        self
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

pub struct YooKassaPaymentAdapter {
    config: YooKassaConfig,
    http_client: reqwest::Client,
}

impl YooKassaPaymentAdapter {
    pub fn new(config: YooKassaConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Request body for `POST /v3/payments`.
    fn payment_body(&self, request: &CheckoutRequest) -> Value {
        json!({
            "amount": {
                "value": request.amount.to_decimal_string(),
                "currency": request.amount.currency.code(),
            },
            "confirmation": {
                "type": "redirect",
                "return_url": self.config.return_url,
            },
            "capture": true,
            "description": request.description,
            "metadata": {
                "payment_id": request.payment_id.to_string(),
                "user_id": request.payer_id.to_string(),
                "type": request.purpose.as_str(),
            },
        })
    }

    fn verify_signature(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), WebhookError> {
        let Some(secret) = &self.config.webhook_secret else {
            return Ok(());
        };
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(WebhookError::MissingSignature)?;

        HmacBodyVerifier::new(secret.expose_secret().as_bytes())
            .verify(body, signature)
            .map_err(|e| {
                warn!("Invalid YooKassa notification signature");
                e
            })
    }

    async fn read_payment(response: reqwest::Response) -> Result<(PaymentObject, Value), PaymentError> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), error = %error_text, "YooKassa API call failed");
            let parsed: Option<ApiErrorBody> = serde_json::from_str(&error_text).ok();
            let message = parsed
                .as_ref()
                .and_then(|b| b.description.clone())
                .unwrap_or_else(|| format!("YooKassa API error ({})", status));
            let code = match status.as_u16() {
                401 | 403 => PaymentErrorCode::AuthenticationError,
                429 => PaymentErrorCode::RateLimitExceeded,
                _ => PaymentErrorCode::ProviderError,
            };
            let mut err = PaymentError::new(code, message);
            if let Some(provider_code) = parsed.and_then(|b| b.code) {
                err = err.with_provider_code(provider_code);
            }
            return Err(err);
        }

        let raw: Value = response.json().await.map_err(|e| {
            PaymentError::invalid_response(format!("Failed to parse YooKassa response: {}", e))
        })?;
        let payment: PaymentObject = serde_json::from_value(raw.clone()).map_err(|e| {
            PaymentError::invalid_response(format!("Unexpected YooKassa payment object: {}", e))
        })?;
        Ok((payment, raw))
    }
}

#[async_trait]
impl PaymentProvider for YooKassaPaymentAdapter {
    fn provider(&self) -> Provider {
        Provider::YooKassa
    }

    async fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<ProviderCheckout, PaymentError> {
        let url = format!("{}/v3/payments", self.config.api_base_url);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.config.shop_id, Some(self.config.secret_key.expose_secret()))
            .header("Idempotence-Key", request.payment_id.to_string())
            .json(&self.payment_body(&request))
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let (payment, raw) = Self::read_payment(response).await?;
        let confirmation_url = payment
            .confirmation
            .and_then(|c| c.confirmation_url)
            .ok_or_else(|| PaymentError::invalid_response("YooKassa returned no confirmation URL"))?;

        Ok(ProviderCheckout {
            correlation_id: payment.id,
            confirmation_url,
            raw,
        })
    }

    async fn fetch_payment(
        &self,
        correlation_id: &str,
    ) -> Result<Option<ProviderEvent>, PaymentError> {
        let url = format!("{}/v3/payments/{}", self.config.api_base_url, correlation_id);

        let response = self
            .http_client
            .get(&url)
            .basic_auth(&self.config.shop_id, Some(self.config.secret_key.expose_secret()))
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let (payment, raw) = Self::read_payment(response).await?;
        Ok(payment
            .status_event()
            .map(|kind| ProviderEvent::new(kind, payment.id.clone(), raw)))
    }

    fn parse_webhook(
        &self,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Option<ProviderEvent>, WebhookError> {
        self.verify_signature(headers, body)?;
        YooKassaNotification::parse(body)?.into_event().map(Some)
    }
}
