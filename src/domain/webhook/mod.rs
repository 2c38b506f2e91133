//! Webhook domain - provider events, authenticity and error semantics.

mod errors;
mod event;
mod signature;

pub use errors::WebhookError;
pub use event::{ProviderEvent, ProviderEventKind};
pub use signature::{secret_token_matches, HmacBodyVerifier};

#[cfg(test)]
pub use signature::compute_test_signature;
