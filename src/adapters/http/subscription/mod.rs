//! HTTP adapter for the subscription gate.
//!
//! - `GET /subscription` - caller's subscription and seller access
//! - `POST /subscription/checkout` - pay for the seller plan
//! - `POST /subscription/cancel` - stop renewals, keep access until period end

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::subscription_routes;
