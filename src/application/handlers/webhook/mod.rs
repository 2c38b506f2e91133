//! Webhook reconciler handlers.

mod handle_provider_webhook;
mod refresh_payment_status;
mod settle_payment;

pub use handle_provider_webhook::{HandleProviderWebhookCommand, HandleProviderWebhookHandler};
pub use refresh_payment_status::{RefreshPaymentStatusCommand, RefreshPaymentStatusHandler};
pub use settle_payment::{PaymentSettler, ReconcileOutcome};
