//! Axum routes for provider webhooks.

use axum::routing::post;
use axum::Router;

use super::super::state::AppState;
use super::handlers::handle_provider_webhook;

pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/webhooks/:provider", post(handle_provider_webhook))
}
