//! DTOs shared by several route groups.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Currency, DomainError, Money, Timestamp};
use crate::domain::payment::Provider;

/// An amount as clients see it: `{"amount": "500.00", "currency": "RUB"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoneyDto {
    pub amount: String,
    pub currency: String,
}

impl From<Money> for MoneyDto {
    fn from(money: Money) -> Self {
        Self {
            amount: money.to_decimal_string(),
            currency: money.currency.code().to_string(),
        }
    }
}

/// Parses an optional decimal price; absent means zero.
pub fn parse_price(amount: Option<&str>, currency: Option<&str>) -> Result<Money, DomainError> {
    let currency = match currency {
        Some(code) => code.parse::<Currency>()?,
        None => Currency::Rub,
    };
    Ok(Money::parse_decimal(amount.unwrap_or_default(), currency)?)
}

/// Body of the checkout endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub provider: String,
}

impl CheckoutRequest {
    pub fn provider(&self) -> Result<Provider, DomainError> {
        Ok(self.provider.trim().to_ascii_lowercase().parse::<Provider>()?)
    }
}

/// Where the payer goes next.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub payment_id: String,
    pub provider: Provider,
    pub confirmation_url: String,
    pub amount: MoneyDto,
    pub reused: bool,
}

impl From<crate::application::handlers::purchase::CheckoutResult> for CheckoutResponse {
    fn from(result: crate::application::handlers::purchase::CheckoutResult) -> Self {
        Self {
            payment_id: result.payment_id.to_string(),
            provider: result.provider,
            confirmation_url: result.confirmation_url,
            amount: result.amount.into(),
            reused: result.reused,
        }
    }
}

pub fn iso(ts: &Timestamp) -> String {
    ts.as_datetime().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_defaults_to_zero_roubles() {
        let price = parse_price(None, None).unwrap();
        assert!(price.is_zero());
        assert_eq!(price.currency, Currency::Rub);
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(parse_price(Some("-5"), None).is_err());
    }

    #[test]
    fn money_renders_as_decimal() {
        let dto = MoneyDto::from(Money::from_minor(49_990, Currency::Rub).unwrap());
        assert_eq!(dto.amount, "499.90");
        assert_eq!(dto.currency, "RUB");
    }

    #[test]
    fn provider_names_are_case_insensitive() {
        let req = CheckoutRequest { provider: "YooKassa".into() };
        assert_eq!(req.provider().unwrap(), Provider::YooKassa);
        assert!(CheckoutRequest { provider: "paypal".into() }.provider().is_err());
    }
}
