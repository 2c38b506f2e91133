//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, money, timestamps, errors, state machine)
//! - `sharing` - Visibility registry: shares, field catalogue, projection
//! - `payment` - Settlement ledger vocabulary: intents and their status table
//! - `purchase` - Purchases and checkout sessions
//! - `subscription` - Seller subscriptions and the grace-window gate
//! - `webhook` - Provider events, signature checks, webhook errors

pub mod foundation;
pub mod payment;
pub mod purchase;
pub mod sharing;
pub mod subscription;
pub mod webhook;
