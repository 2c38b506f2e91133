//! Router assembly and cross-cutting layers.

use std::time::Duration;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::purchases::purchase_routes;
use super::shares::share_routes;
use super::state::AppState;
use super::subscription::subscription_routes;
use super::webhooks::webhook_routes;

/// Transport settings for the router layers.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub request_timeout: Duration,
    /// Allowed browser origins; empty allows any.
    pub cors_origins: Vec<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            cors_origins: Vec::new(),
        }
    }
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(parsed)
}

/// Builds the complete API router.
///
/// # Routes
/// - shares: publish, catalogue, browse, field visibility, deactivate
/// - purchases: purchase, checkout, history, payment refresh
/// - subscription: status, checkout, cancel
/// - webhooks: `POST /webhooks/:provider`
/// - `GET /health`
pub fn api_router(state: AppState, settings: &HttpSettings) -> Router {
    Router::new()
        .merge(share_routes())
        .merge(purchase_routes())
        .merge(subscription_routes())
        .merge(webhook_routes())
        .route("/health", get(health))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(settings.request_timeout))
                .layer(cors_layer(&settings.cors_origins)),
        )
}
