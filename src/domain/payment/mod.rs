//! Payment domain - the settlement ledger's vocabulary.

mod intent;
mod provider;
mod status;

pub use intent::PaymentIntent;
pub use provider::{PaymentPurpose, PaymentTarget, Provider};
pub use status::PaymentStatus;
