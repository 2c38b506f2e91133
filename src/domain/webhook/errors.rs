//! Webhook error types.
//!
//! Every failure maps to an HTTP status that tells the provider whether to
//! retry. Unmatched or ignored events are not errors at all; they are
//! acknowledged by the reconciler.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature or secret token did not match.
    #[error("Invalid signature")]
    InvalidSignature,

    /// A signature is required but none was sent.
    #[error("Missing signature")]
    MissingSignature,

    /// Body is not valid JSON or has an unexpected shape.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing from the payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// No adapter is registered for the provider in the path.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Applying the event failed; the provider should retry.
    #[error("Processing failed: {0}")]
    Processing(String),

    /// Storage failed; the provider should retry.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true if the provider should retry delivering this webhook.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Processing(_) | WebhookError::Database(_))
    }

    /// Maps the error to an HTTP status code.
    ///
    /// - 4xx: malformed or unauthenticated, retrying will not help
    /// - 5xx: our failure, the provider will retry
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature | WebhookError::MissingSignature => {
                StatusCode::UNAUTHORIZED
            }

            WebhookError::ParseError(_) | WebhookError::MissingField(_) => StatusCode::BAD_REQUEST,

            WebhookError::UnknownProvider(_) => StatusCode::NOT_FOUND,

            WebhookError::Processing(_) | WebhookError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::DatabaseError => WebhookError::Database(err.message),
            ErrorCode::ProviderProtocolError => WebhookError::ParseError(err.message),
            _ => WebhookError::Processing(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Display
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parse_error_displays_message() {
        let err = WebhookError::ParseError("invalid JSON".to_string());
        assert_eq!(format!("{}", err), "Parse error: invalid JSON");
    }

    #[test]
    fn missing_field_displays_field_name() {
        let err = WebhookError::MissingField("object.id");
        assert_eq!(format!("{}", err), "Missing field: object.id");
    }

    // ══════════════════════════════════════════════════════════════
    // Status codes and retry semantics
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn signature_failures_are_unauthorized() {
        assert_eq!(WebhookError::InvalidSignature.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(WebhookError::MissingSignature.status_code(), StatusCode::UNAUTHORIZED);
        assert!(!WebhookError::InvalidSignature.is_retryable());
    }

    #[test]
    fn malformed_payloads_are_bad_requests() {
        assert_eq!(
            WebhookError::ParseError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(WebhookError::MissingField("id").status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn processing_failures_ask_for_retry() {
        let err = WebhookError::Processing("purchase failed".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_retryable());
        assert!(WebhookError::Database("down".into()).is_retryable());
    }

    #[test]
    fn unknown_provider_is_not_found() {
        let err = WebhookError::UnknownProvider("paypal".into());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn domain_database_error_converts_to_retryable() {
        let err: WebhookError = DomainError::new(ErrorCode::DatabaseError, "timeout").into();
        assert!(matches!(err, WebhookError::Database(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn other_domain_errors_convert_to_processing() {
        let err: WebhookError = DomainError::new(ErrorCode::ShareNotFound, "gone").into();
        assert!(matches!(err, WebhookError::Processing(_)));
    }
}
