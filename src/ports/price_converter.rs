//! Pricing conversion port.
//!
//! Converting a seller's price into a provider's settlement currency is a
//! business policy, so it is injected rather than hard-coded.

use crate::domain::foundation::{Currency, DomainError, Money};

pub trait PriceConverter: Send + Sync {
    /// Converts `amount` into `target`. Identity when currencies match.
    fn convert(&self, amount: Money, target: Currency) -> Result<Money, DomainError>;
}
