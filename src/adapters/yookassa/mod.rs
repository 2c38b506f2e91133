//! YooKassa payment provider adapter.
//!
//! - `yookassa_adapter` - `PaymentProvider` over the YooKassa v3 REST API
//! - `webhook_types` - notification and payment objects as YooKassa sends them

mod webhook_types;
mod yookassa_adapter;

pub use webhook_types::{PaymentObject, YooKassaNotification, SIGNATURE_HEADER};
pub use yookassa_adapter::{YooKassaConfig, YooKassaPaymentAdapter};
