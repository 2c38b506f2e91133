//! HTTP middleware for axum.
//!
//! - `auth` - caller identity extraction

pub mod auth;

pub use auth::{AuthenticatedUser, AuthenticationRequired, USER_ID_HEADER};
