//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - sqlx repositories for every storage port
//! - `memory` - in-process repositories for tests and local runs
//! - `yookassa` - YooKassa REST checkout, polling and notifications
//! - `telegram` - Telegram Stars invoice links and payment updates
//! - `mock_provider` - scriptable provider for tests
//! - `pricing` - fixed-rate currency conversion
//! - `http` - the axum REST API

pub mod http;
pub mod memory;
pub mod mock_provider;
pub mod postgres;
pub mod pricing;
pub mod telegram;
pub mod yookassa;

pub use mock_provider::{MockPaymentProvider, MOCK_SIGNATURE_HEADER};
pub use pricing::{FixedRateConverter, DEFAULT_RUB_PER_STAR};
pub use telegram::{TelegramStarsAdapter, TelegramStarsConfig};
pub use yookassa::{YooKassaConfig, YooKassaPaymentAdapter};
