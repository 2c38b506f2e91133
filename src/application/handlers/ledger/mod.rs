//! Settlement ledger handlers.

mod lookup_payment;
mod open_payment;
mod transition_payment;

pub use lookup_payment::{LookupByCorrelationIdHandler, LookupByCorrelationIdQuery, PaymentLocator};
pub use open_payment::{OpenPaymentCommand, OpenPaymentHandler};
pub use transition_payment::{
    TransitionPaymentCommand, TransitionPaymentHandler, TransitionPaymentResult,
};
