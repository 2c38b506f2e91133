//! Subscription domain - the seller gate.

mod aggregate;
mod plan;
mod status;

pub use aggregate::{Subscription, DEFAULT_GRACE_DAYS};
pub use plan::{Plan, PlanTerms};
pub use status::SubscriptionStatus;
