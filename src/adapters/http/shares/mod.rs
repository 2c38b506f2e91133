//! HTTP adapter for the visibility registry.
//!
//! - `POST /shares` - publish or reconfigure a share
//! - `GET /shares` - public catalogue
//! - `GET /shares/mine` - caller's active shares
//! - `GET /shares/by-token/:token` - browse through a deep link
//! - `GET /shares/:id` - browse by id
//! - `PATCH /shares/:id/fields` - change field visibility
//! - `DELETE /shares/:id` - deactivate

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::share_routes;
