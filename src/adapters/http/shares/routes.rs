//! Axum routes for share endpoints.

use axum::routing::{get, patch, post};
use axum::Router;

use super::super::state::AppState;
use super::handlers::{
    browse_by_id, browse_by_token, deactivate_share, list_my_shares, list_public_shares,
    publish_share, update_fields,
};

/// Share routes.
///
/// Purchase and checkout routes under `/shares` live with the purchase
/// adapter; both groups are merged at the top level.
pub fn share_routes() -> Router<AppState> {
    Router::new()
        .route("/shares", post(publish_share).get(list_public_shares))
        .route("/shares/mine", get(list_my_shares))
        .route("/shares/by-token/:token", get(browse_by_token))
        .route("/shares/:id", get(browse_by_id).delete(deactivate_share))
        .route("/shares/:id/fields", patch(update_fields))
}
