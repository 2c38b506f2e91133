//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid host address")]
    InvalidHost,

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid checkout timeout")]
    InvalidCheckoutTimeout,

    #[error("Stars exchange rate must be positive")]
    InvalidStarsRate,

    #[error("Grace period cannot be negative")]
    NegativeGraceDays,

    #[error("Invalid subscription price: {0}")]
    InvalidSubscriptionPrice(String),

    #[error("Billing cycle must be at least one day")]
    InvalidBillingCycle,

    #[error("Public page size must be between 1 and 50")]
    InvalidPageSize,
}
