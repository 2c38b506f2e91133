//! Telegram Stars payment provider adapter.
//!
//! - `telegram_adapter` - invoice links through the Bot API
//! - `update_types` - the slice of a Telegram update carrying payments

mod telegram_adapter;
mod update_types;

pub use telegram_adapter::{TelegramStarsAdapter, TelegramStarsConfig, SECRET_TOKEN_HEADER};
pub use update_types::{invoice_payload_for, TelegramUpdate};
