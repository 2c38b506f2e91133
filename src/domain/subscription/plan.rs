//! Subscription plans.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Money, ValidationError};

/// Billing plan of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Free,
    Seller,
    SellerPro,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Seller => "seller",
            Plan::SellerPro => "seller_pro",
        }
    }

    /// Whether the plan allows publishing paid shares.
    pub fn grants_seller_access(&self) -> bool {
        matches!(self, Plan::Seller | Plan::SellerPro)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Plan::Free),
            "seller" => Ok(Plan::Seller),
            "seller_pro" => Ok(Plan::SellerPro),
            other => Err(ValidationError::invalid_format(
                "plan",
                format!("unknown plan '{}'", other),
            )),
        }
    }
}

/// What a plan costs and how long one paid period lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTerms {
    pub plan: Plan,
    pub price: Money,
    pub billing_cycle_days: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_seller_plans_grant_access() {
        assert!(!Plan::Free.grants_seller_access());
        assert!(Plan::Seller.grants_seller_access());
        assert!(Plan::SellerPro.grants_seller_access());
    }

    #[test]
    fn plan_names_round_trip() {
        for plan in [Plan::Free, Plan::Seller, Plan::SellerPro] {
            assert_eq!(plan.as_str().parse::<Plan>().unwrap(), plan);
        }
    }
}
