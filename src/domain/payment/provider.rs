//! Payment providers and payment purposes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Currency, ShareId, SubscriptionId, ValidationError};
use crate::domain::subscription::Plan;

/// External payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    YooKassa,
    /// Telegram Stars invoices.
    Telegram,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::YooKassa => "yookassa",
            Provider::Telegram => "telegram",
        }
    }

    /// Currency the provider settles in, if it forces one.
    pub fn settlement_currency(&self) -> Option<Currency> {
        match self {
            Provider::Telegram => Some(Currency::Xtr),
            Provider::YooKassa => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yookassa" => Ok(Provider::YooKassa),
            "telegram" | "telegram_stars" => Ok(Provider::Telegram),
            other => Err(ValidationError::invalid_format(
                "provider",
                format!("unknown payment provider '{}'", other),
            )),
        }
    }
}

/// What a payment is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPurpose {
    SubscriptionPurchase,
    ContactPurchase,
}

impl PaymentPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentPurpose::SubscriptionPurchase => "subscription",
            PaymentPurpose::ContactPurchase => "contact_purchase",
        }
    }
}

impl fmt::Display for PaymentPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentPurpose {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subscription" | "subscription_renewal" => Ok(PaymentPurpose::SubscriptionPurchase),
            "contact_purchase" => Ok(PaymentPurpose::ContactPurchase),
            other => Err(ValidationError::invalid_format(
                "purpose",
                format!("unknown payment purpose '{}'", other),
            )),
        }
    }
}

/// The entity a payment settles into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentTarget {
    /// A specific share the payer is buying.
    Share { share_id: ShareId },

    /// A seller plan. `subscription_id` is empty for a first payment.
    Subscription {
        plan: Plan,
        subscription_id: Option<SubscriptionId>,
    },
}

impl PaymentTarget {
    pub fn purpose(&self) -> PaymentPurpose {
        match self {
            PaymentTarget::Share { .. } => PaymentPurpose::ContactPurchase,
            PaymentTarget::Subscription { .. } => PaymentPurpose::SubscriptionPurchase,
        }
    }

    pub fn share_id(&self) -> Option<ShareId> {
        match self {
            PaymentTarget::Share { share_id } => Some(*share_id),
            PaymentTarget::Subscription { .. } => None,
        }
    }
}
