//! Payment provider port for external payment processing.
//!
//! Each adapter (YooKassa, Telegram Stars, test doubles) turns a checkout
//! request into a provider-hosted confirmation page and turns webhook
//! deliveries into provider-neutral [`ProviderEvent`]s.
//!
//! # Design
//!
//! - **Gateway agnostic**: callers only see confirmation URLs and correlation ids
//! - **Idempotent**: checkout creation is keyed by the payment intent id
//! - **Synchronous verification**: webhook parsing does no I/O

use async_trait::async_trait;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{DomainError, ErrorCode, Money, PaymentId, UserId};
use crate::domain::payment::{PaymentPurpose, Provider};
use crate::domain::webhook::{ProviderEvent, WebhookError};

/// Port for payment provider integrations.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Which provider this adapter talks to.
    fn provider(&self) -> Provider;

    /// Creates a provider-hosted checkout for a pending intent.
    ///
    /// Must be idempotent on `request.payment_id`.
    async fn create_checkout(&self, request: CheckoutRequest)
        -> Result<ProviderCheckout, PaymentError>;

    /// Asks the provider for the latest state of a payment.
    ///
    /// Returns `None` while the payment is still pending at the provider.
    async fn fetch_payment(&self, correlation_id: &str)
        -> Result<Option<ProviderEvent>, PaymentError>;

    /// Authenticates and parses a webhook delivery.
    ///
    /// Returns `Ok(None)` for deliveries that carry no payment event and
    /// only need to be acknowledged.
    fn parse_webhook(
        &self,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Option<ProviderEvent>, WebhookError>;
}

/// Request to create a checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Internal intent id; used as the idempotency key.
    pub payment_id: PaymentId,

    pub payer_id: UserId,
    pub purpose: PaymentPurpose,

    /// Amount in the currency the provider settles in.
    pub amount: Money,

    pub description: String,
}

/// Provider-neutral checkout result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderCheckout {
    /// Provider's payment identifier.
    pub correlation_id: String,

    /// Page where the payer completes payment.
    pub confirmation_url: String,

    /// Raw provider response, kept for audit.
    pub raw: Value,
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Create with provider code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::Timeout, message)
    }

    /// Create an error for a malformed provider response.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidResponse, message)
    }

    /// Create an error for an operation the provider does not offer.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::Unsupported, message)
    }

    /// Create a generic provider API error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        let code = match err.code {
            PaymentErrorCode::Timeout => ErrorCode::ProviderTimeout,
            PaymentErrorCode::InvalidResponse => ErrorCode::ProviderProtocolError,
            _ => ErrorCode::ProviderError,
        };

        let mut domain = DomainError::new(code, err.message)
            .with_detail("provider_error", err.code.to_string());
        if let Some(provider_code) = err.provider_code {
            domain = domain.with_detail("provider_code", provider_code);
        }
        domain
    }
}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// The call did not finish within the configured bound.
    Timeout,

    /// API authentication failed.
    AuthenticationError,

    /// Provider answered with something we cannot parse.
    InvalidResponse,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// The provider has no such operation.
    Unsupported,

    /// Provider API error.
    ProviderError,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError
                | PaymentErrorCode::Timeout
                | PaymentErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::Timeout => "timeout",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::InvalidResponse => "invalid_response",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::Unsupported => "unsupported",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
