//! Application configuration module
//!
//! Configuration is loaded from environment variables with the
//! `CONTACT_EXCHANGE` prefix; nested values use `__` as the separator.
//!
//! # Example
//!
//! ```no_run
//! use contact_exchange::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! println!("Listening on {:?}", config.server.socket_addr());
//! ```

mod database;
mod error;
mod payment;
mod server;
mod sharing;

pub use database::{DatabaseConfig, StorageMode};
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};
pub use sharing::SharingConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub payment: PaymentConfig,

    #[serde(default)]
    pub sharing: SharingConfig,
}

impl AppConfig {
    /// Load and validate configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CONTACT_EXCHANGE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Validates every section
    ///
    /// # Environment Variable Format
    ///
    /// - `CONTACT_EXCHANGE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CONTACT_EXCHANGE__PAYMENT__YOOKASSA_SHOP_ID=...` -> `payment.yookassa_shop_id`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config: Self = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CONTACT_EXCHANGE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate()?;
        self.sharing.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
