//! HTTP handler for provider webhooks.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::debug;

use crate::application::handlers::webhook::{HandleProviderWebhookCommand, ReconcileOutcome};

use super::super::error::WebhookApiError;
use super::super::state::AppState;

/// POST /webhooks/:provider
///
/// Acknowledges with `{"status": "ok"}` whenever retrying would not change
/// the outcome, including payments we do not know.
pub async fn handle_provider_webhook(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let outcome = state
        .provider_webhook
        .handle(HandleProviderWebhookCommand {
            provider,
            headers,
            body: body.to_vec(),
        })
        .await?;

    match &outcome {
        ReconcileOutcome::Applied { payment_id, status, settled } => {
            debug!(payment_id = %payment_id, status = %status, settled, "Webhook applied");
        }
        ReconcileOutcome::Ignored { event } => debug!(event = %event, "Webhook ignored"),
        ReconcileOutcome::Unmatched { correlation_id } => {
            debug!(correlation_id = %correlation_id, "Webhook acknowledged without a payment");
        }
    }

    Ok(Json(json!({"status": "ok"})))
}
