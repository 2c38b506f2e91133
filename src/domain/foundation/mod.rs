//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, error types and the state machine
//! trait that form the vocabulary of the marketplace domain.

mod errors;
mod ids;
mod money;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CheckoutSessionId, ContactId, PaymentId, PurchaseId, ShareId, SubscriptionId, UserId};
pub use money::{Currency, Money};
pub use state_machine::{StateMachine, TransitionOutcome};
pub use timestamp::Timestamp;
