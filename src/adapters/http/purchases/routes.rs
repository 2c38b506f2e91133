//! Axum routes for purchase, checkout and payment endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::super::state::AppState;
use super::handlers::{
    checkout_by_id, checkout_by_token, list_purchases, purchase_by_id, purchase_by_token,
    refresh_payment,
};

pub fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route("/shares/:id/purchase", post(purchase_by_id))
        .route("/shares/:id/checkout", post(checkout_by_id))
        .route("/shares/by-token/:token/purchase", post(purchase_by_token))
        .route("/shares/by-token/:token/checkout", post(checkout_by_token))
        .route("/purchases", get(list_purchases))
        .route("/payments/:id/refresh", post(refresh_payment))
}
