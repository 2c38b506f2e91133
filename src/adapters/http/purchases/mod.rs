//! HTTP adapter for purchases, checkouts and payment status.
//!
//! - `POST /shares/:id/purchase`, `POST /shares/by-token/:token/purchase`
//! - `POST /shares/:id/checkout`, `POST /shares/by-token/:token/checkout`
//! - `GET /purchases` - caller's purchase history
//! - `POST /payments/:id/refresh` - poll the provider for a pending payment

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::purchase_routes;
