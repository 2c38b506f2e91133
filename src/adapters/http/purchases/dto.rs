//! Purchase and payment bodies.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::payment::{PaymentIntent, PaymentStatus, Provider};
use crate::domain::purchase::Purchase;

use super::super::dto::{iso, CheckoutResponse, MoneyDto};

/// Body of the purchase endpoints; empty for free shares.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseRequest {
    /// Succeeded payment that pays for a Paid share.
    #[serde(default)]
    pub payment_id: Option<Uuid>,
}

/// A purchase as the buyer sees it.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseResponse {
    pub purchase_id: String,
    /// The buyer's own copy of the contact.
    pub contact_id: String,
    pub amount_paid: MoneyDto,
    pub payment_id: Option<String>,
    pub created_at: String,
}

impl From<&Purchase> for PurchaseResponse {
    fn from(purchase: &Purchase) -> Self {
        Self {
            purchase_id: purchase.id.to_string(),
            contact_id: purchase.copied_contact_id.to_string(),
            amount_paid: purchase.amount_paid.into(),
            payment_id: purchase.payment_id.map(|id| id.to_string()),
            created_at: iso(&purchase.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseResultResponse {
    #[serde(flatten)]
    pub purchase: PurchaseResponse,
    pub newly_created: bool,
}

/// Checkout outcome: a payment page, or the copy the buyer already owns.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ShareCheckoutResponse {
    PaymentRequired(CheckoutResponse),
    AlreadyPurchased { purchase: PurchaseResponse },
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentResponse {
    pub payment_id: String,
    pub status: PaymentStatus,
    pub provider: Provider,
    pub amount: MoneyDto,
    pub confirmation_url: Option<String>,
    pub settled: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&PaymentIntent> for PaymentResponse {
    fn from(intent: &PaymentIntent) -> Self {
        Self {
            payment_id: intent.id.to_string(),
            status: intent.status,
            provider: intent.provider,
            amount: intent.amount.into(),
            confirmation_url: intent.confirmation_url.clone(),
            settled: intent.settled_at.is_some(),
            created_at: iso(&intent.created_at),
            updated_at: iso(&intent.updated_at),
        }
    }
}
