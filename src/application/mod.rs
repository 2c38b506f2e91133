//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers write; query handlers only read.

pub mod handlers;
mod provider_registry;

pub use provider_registry::ProviderRegistry;
