//! Mock payment provider for testing.
//!
//! Provides a configurable `PaymentProvider` for unit and integration tests.
//! Supports:
//! - Error injection, per call or sticky
//! - Artificial latency, for timeout tests
//! - Scripted status-poll answers
//! - Call tracking
//!
//! Webhooks are plain JSON `{"event": "...", "payment_id": "..."}`. When a
//! secret is configured, the `X-Mock-Signature` header must carry the hex
//! HMAC of the body.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use http::HeaderMap;
use serde::Deserialize;
use serde_json::json;

use crate::domain::payment::Provider;
use crate::domain::webhook::{HmacBodyVerifier, ProviderEvent, ProviderEventKind, WebhookError};
use crate::ports::{CheckoutRequest, PaymentError, PaymentProvider, ProviderCheckout};

/// Header carrying the mock webhook signature.
pub const MOCK_SIGNATURE_HEADER: &str = "x-mock-signature";

/// Mock payment provider for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new(Provider::YooKassa);
/// mock.set_error(PaymentError::network("connection reset"));
/// mock.set_delay(Duration::from_secs(30));
/// assert_eq!(mock.call_count("create_checkout"), 1);
/// ```
#[derive(Clone)]
pub struct MockPaymentProvider {
    provider: Provider,
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Error returned by the next call only.
    next_error: Option<PaymentError>,

    /// Errors returned by every call to a method.
    method_errors: HashMap<String, PaymentError>,

    /// Latency added to `create_checkout`.
    delay: Option<Duration>,

    /// Status-poll answers by correlation id.
    statuses: HashMap<String, ProviderEvent>,

    /// Webhook signing secret; `None` accepts unsigned bodies.
    webhook_secret: Option<String>,

    call_log: Vec<MethodCall>,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

#[derive(Deserialize)]
struct MockWebhook {
    event: String,
    payment_id: String,
}

impl MockPaymentProvider {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            inner: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// A mock whose webhooks must be signed with `secret`.
    pub fn with_webhook_secret(provider: Provider, secret: impl Into<String>) -> Self {
        let mock = Self::new(provider);
        mock.state().webhook_secret = Some(secret.into());
        mock
    }

    /// Correlation id the mock assigns to an intent's checkout.
    pub fn correlation_id_for(payment_id: &impl std::fmt::Display) -> String {
        format!("mock_{}", payment_id)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }

    /// Set an error for every call to a specific method.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.state().method_errors.insert(method.to_string(), error);
    }

    /// Clear all configured errors.
    pub fn clear_errors(&self) {
        let mut state = self.state();
        state.next_error = None;
        state.method_errors.clear();
    }

    /// Delay every checkout creation.
    pub fn set_delay(&self, delay: Duration) {
        self.state().delay = Some(delay);
    }

    /// Answer status polls for `correlation_id` with `kind`.
    pub fn set_status(&self, correlation_id: &str, kind: ProviderEventKind) {
        let event = ProviderEvent::new(
            kind,
            correlation_id,
            json!({"id": correlation_id, "source": "poll"}),
        );
        self.state()
            .statuses
            .insert(correlation_id.to_string(), event);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    /// Poisoning only happens when a test already panicked.
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.state().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), PaymentError> {
        let mut state = self.state();
        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<ProviderCheckout, PaymentError> {
        self.record_call(
            "create_checkout",
            vec![request.payment_id.to_string(), request.amount.to_string()],
        );

        let delay = self.state().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_error("create_checkout")?;

        let correlation_id = Self::correlation_id_for(&request.payment_id);
        Ok(ProviderCheckout {
            confirmation_url: format!("https://pay.example.test/checkout/{}", correlation_id),
            raw: json!({
                "id": correlation_id,
                "amount": request.amount.to_decimal_string(),
                "currency": request.amount.currency.code(),
            }),
            correlation_id,
        })
    }

    async fn fetch_payment(
        &self,
        correlation_id: &str,
    ) -> Result<Option<ProviderEvent>, PaymentError> {
        self.record_call("fetch_payment", vec![correlation_id.to_string()]);
        self.check_error("fetch_payment")?;
        Ok(self.state().statuses.get(correlation_id).cloned())
    }

    fn parse_webhook(
        &self,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Option<ProviderEvent>, WebhookError> {
        self.record_call("parse_webhook", vec![body.len().to_string()]);

        let secret = self.state().webhook_secret.clone();
        if let Some(secret) = secret {
            let signature = headers
                .get(MOCK_SIGNATURE_HEADER)
                .and_then(|v| v.to_str().ok())
                .ok_or(WebhookError::MissingSignature)?;
            HmacBodyVerifier::new(secret).verify(body, signature)?;
        }

        let raw: serde_json::Value =
            serde_json::from_slice(body).map_err(|e| WebhookError::ParseError(e.to_string()))?;
        let webhook: MockWebhook = serde_json::from_value(raw.clone())
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        Ok(Some(ProviderEvent::new(
            ProviderEventKind::from_event_name(&webhook.event),
            webhook.payment_id,
            raw,
        )))
    }
}
