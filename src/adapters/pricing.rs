//! Fixed-rate price conversion into Telegram Stars.

use crate::domain::foundation::{Currency, DomainError, ErrorCode, Money};
use crate::ports::PriceConverter;

/// Default RUB price of one Star.
pub const DEFAULT_RUB_PER_STAR: i64 = 2;

/// Converts RUB prices into Stars at a fixed rate, rounding down but never
/// below one Star. Other pairs are not supported.
#[derive(Debug, Clone, Copy)]
pub struct FixedRateConverter {
    rub_per_star: i64,
}

impl FixedRateConverter {
    pub fn new(rub_per_star: i64) -> Result<Self, DomainError> {
        if rub_per_star <= 0 {
            return Err(DomainError::validation(
                "stars_per_currency_unit",
                "Star rate must be positive",
            ));
        }
        Ok(Self { rub_per_star })
    }
}

impl Default for FixedRateConverter {
    fn default() -> Self {
        Self {
            rub_per_star: DEFAULT_RUB_PER_STAR,
        }
    }
}

impl PriceConverter for FixedRateConverter {
    fn convert(&self, amount: Money, target: Currency) -> Result<Money, DomainError> {
        if amount.currency == target {
            return Ok(amount);
        }

        match (amount.currency, target) {
            (Currency::Rub, Currency::Xtr) => {
                let minor_per_star = self.rub_per_star * 10_i64.pow(Currency::Rub.exponent());
                let stars = (amount.minor / minor_per_star).max(1);
                Ok(Money::from_minor(stars, Currency::Xtr)?)
            }
            (from, to) => Err(DomainError::new(
                ErrorCode::ProviderError,
                format!("No conversion rate from {} to {}", from, to),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rub(minor: i64) -> Money {
        Money::from_minor(minor, Currency::Rub).unwrap()
    }

    #[test]
    fn converts_rub_to_stars_rounding_down() {
        let converter = FixedRateConverter::default();
        assert_eq!(converter.convert(rub(50_000), Currency::Xtr).unwrap().minor, 250);
        assert_eq!(converter.convert(rub(50_199), Currency::Xtr).unwrap().minor, 250);
    }

    #[test]
    fn tiny_price_is_at_least_one_star() {
        let converter = FixedRateConverter::default();
        let stars = converter.convert(rub(50), Currency::Xtr).unwrap();
        assert_eq!(stars, Money::from_minor(1, Currency::Xtr).unwrap());
    }

    #[test]
    fn same_currency_is_identity() {
        let converter = FixedRateConverter::new(3).unwrap();
        assert_eq!(converter.convert(rub(990), Currency::Rub).unwrap(), rub(990));
    }

    #[test]
    fn unknown_pair_is_an_error() {
        let converter = FixedRateConverter::default();
        let usd = Money::from_minor(100, Currency::Usd).unwrap();
        assert!(converter.convert(usd, Currency::Xtr).is_err());
    }

    #[test]
    fn non_positive_rate_is_rejected() {
        assert!(FixedRateConverter::new(0).is_err());
    }
}
