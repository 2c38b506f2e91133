//! HTTP adapter - the REST API.
//!
//! Each area has its own module with `dto`, `handlers` and `routes`:
//! - `shares` - visibility registry
//! - `purchases` - purchases, checkouts, payment polling
//! - `subscription` - seller plan
//! - `webhooks` - provider callbacks
//!
//! Callers are identified by the `X-User-Id` header (see `middleware`).

pub mod dto;
pub mod error;
pub mod middleware;
pub mod purchases;
pub mod shares;
pub mod subscription;
pub mod webhooks;

mod router;
mod state;

pub use error::{ApiError, ErrorResponse, WebhookApiError};
pub use middleware::{AuthenticatedUser, USER_ID_HEADER};
pub use router::{api_router, HttpSettings};
pub use state::{AppState, Repositories, ServiceSettings};
