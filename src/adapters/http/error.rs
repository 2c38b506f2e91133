//! Error responses for the REST API.
//!
//! Every handler returns `Result<_, ApiError>`; the status code is derived
//! from the domain error code in one place.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::webhook::WebhookError;

/// Standard error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// API error type that converts domain errors to HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.code {
            code if code.is_not_found() => StatusCode::NOT_FOUND,
            ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden | ErrorCode::SellerAccessRequired => StatusCode::FORBIDDEN,
            ErrorCode::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
            ErrorCode::AlreadyPurchased
            | ErrorCode::ConcurrencyConflict
            | ErrorCode::InvalidStateTransition => StatusCode::CONFLICT,
            ErrorCode::ProviderError
            | ErrorCode::ProviderTimeout
            | ErrorCode::ProviderProtocolError => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let err = self.0;

        // Storage and internal failures are logged, never echoed.
        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %err, "Request failed");
            ErrorResponse::new(err.code.to_string(), "Internal server error")
        } else if status == StatusCode::SERVICE_UNAVAILABLE {
            ErrorResponse::with_details(
                err.code.to_string(),
                "Payment provider is unavailable, please try again",
                details(&err),
            )
        } else if err.details.is_empty() {
            ErrorResponse::new(err.code.to_string(), err.message)
        } else {
            let details = details(&err);
            ErrorResponse::with_details(err.code.to_string(), err.message, details)
        };

        (status, Json(body)).into_response()
    }
}

fn details(err: &DomainError) -> Value {
    err.details
        .iter()
        .map(|(k, v)| (k.clone(), Value::from(v.clone())))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

/// Webhook failures keep their own status table so providers know whether
/// to retry.
pub struct WebhookApiError(pub WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let code = match &self.0 {
            WebhookError::InvalidSignature | WebhookError::MissingSignature => "INVALID_SIGNATURE",
            WebhookError::ParseError(_) | WebhookError::MissingField(_) => "INVALID_PAYLOAD",
            WebhookError::UnknownProvider(_) => "UNKNOWN_PROVIDER",
            WebhookError::Processing(_) | WebhookError::Database(_) => "PROCESSING_FAILED",
        };
        let message = if self.0.is_retryable() {
            "Webhook processing failed".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
