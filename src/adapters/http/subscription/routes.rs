//! Axum routes for subscription endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::super::state::AppState;
use super::handlers::{cancel_subscription, get_subscription, start_subscription_checkout};

pub fn subscription_routes() -> Router<AppState> {
    Router::new()
        .route("/subscription", get(get_subscription))
        .route("/subscription/checkout", post(start_subscription_checkout))
        .route("/subscription/cancel", post(cancel_subscription))
}
