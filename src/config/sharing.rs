//! Marketplace configuration: deep links, seller plan and listing limits

use serde::Deserialize;

use crate::domain::foundation::{Currency, Money, ValidationError as DomainValidationError};
use crate::domain::subscription::{Plan, PlanTerms};

use super::error::ValidationError;

const MAX_PAGE_LIMIT: u32 = 50;

#[derive(Debug, Clone, Deserialize)]
pub struct SharingConfig {
    /// Telegram bot username that deep links open
    #[serde(default = "default_bot_username")]
    pub bot_username: String,

    /// Days of seller access kept after the paid period ends
    #[serde(default = "default_grace_days")]
    pub grace_days: i64,

    /// Seller plan price as a decimal string, e.g. "990" or "990.00"
    #[serde(default = "default_subscription_price")]
    pub subscription_price: String,

    #[serde(default = "default_subscription_currency")]
    pub subscription_currency: String,

    #[serde(default = "default_billing_cycle_days")]
    pub billing_cycle_days: i64,

    /// Largest page the public catalogue serves
    #[serde(default = "default_max_public_page")]
    pub max_public_page: u32,
}

impl SharingConfig {
    /// Terms of the seller plan sold through subscription checkout.
    pub fn plan_terms(&self) -> Result<PlanTerms, ValidationError> {
        let currency: Currency = self
            .subscription_currency
            .parse()
            .map_err(|e: DomainValidationError| ValidationError::InvalidSubscriptionPrice(e.to_string()))?;
        let price = Money::parse_decimal(&self.subscription_price, currency)
            .map_err(|e| ValidationError::InvalidSubscriptionPrice(e.to_string()))?;
        if price.is_zero() {
            return Err(ValidationError::InvalidSubscriptionPrice(
                "price must be positive".to_string(),
            ));
        }
        Ok(PlanTerms {
            plan: Plan::Seller,
            price,
            billing_cycle_days: self.billing_cycle_days,
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.bot_username.trim().is_empty() {
            return Err(ValidationError::MissingRequired("SHARING__BOT_USERNAME"));
        }
        if self.grace_days < 0 {
            return Err(ValidationError::NegativeGraceDays);
        }
        if self.billing_cycle_days < 1 {
            return Err(ValidationError::InvalidBillingCycle);
        }
        if self.max_public_page == 0 || self.max_public_page > MAX_PAGE_LIMIT {
            return Err(ValidationError::InvalidPageSize);
        }
        self.plan_terms()?;
        Ok(())
    }
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            bot_username: default_bot_username(),
            grace_days: default_grace_days(),
            subscription_price: default_subscription_price(),
            subscription_currency: default_subscription_currency(),
            billing_cycle_days: default_billing_cycle_days(),
            max_public_page: default_max_public_page(),
        }
    }
}

fn default_bot_username() -> String {
    "contact_exchange_bot".to_string()
}

fn default_grace_days() -> i64 {
    3
}

fn default_subscription_price() -> String {
    "990".to_string()
}

fn default_subscription_currency() -> String {
    "RUB".to_string()
}

fn default_billing_cycle_days() -> i64 {
    30
}

fn default_max_public_page() -> u32 {
    MAX_PAGE_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_is_990_roubles_for_30_days() {
        let terms = SharingConfig::default().plan_terms().unwrap();
        assert_eq!(terms.plan, Plan::Seller);
        assert_eq!(terms.price, Money::from_minor(99_000, Currency::Rub).unwrap());
        assert_eq!(terms.billing_cycle_days, 30);
    }

    #[test]
    fn negative_grace_days_are_rejected() {
        let config = SharingConfig {
            grace_days: -1,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::NegativeGraceDays));
    }

    #[test]
    fn zero_grace_days_are_allowed() {
        let config = SharingConfig {
            grace_days: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_price_is_rejected() {
        let config = SharingConfig {
            subscription_price: "abc".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidSubscriptionPrice(_))
        ));
    }

    #[test]
    fn page_size_is_capped() {
        let config = SharingConfig {
            max_public_page: 500,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPageSize));
    }
}
