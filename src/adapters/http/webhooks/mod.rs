//! HTTP adapter for provider webhooks.
//!
//! `POST /webhooks/:provider` needs no caller identity; each provider
//! adapter authenticates its own deliveries.

pub mod handlers;
pub mod routes;

pub use routes::webhook_routes;
