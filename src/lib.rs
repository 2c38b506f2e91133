//! Contact Exchange - contact sharing marketplace
//!
//! Owners publish shares of their contacts with a visibility policy; buyers
//! browse filtered previews and purchase copies, paid through YooKassa or
//! Telegram Stars. Provider webhooks settle payments exactly once, and seller
//! subscriptions gate who may publish paid shares.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
