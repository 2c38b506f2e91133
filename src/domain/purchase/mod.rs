//! Purchase domain - durable record that a buyer owns a share.

mod checkout;

pub use checkout::{CheckoutSession, CheckoutTarget};

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    ContactId, Money, PaymentId, PurchaseId, ShareId, Timestamp, UserId,
};
use crate::domain::sharing::Share;

/// A buyer's acquisition of a share.
///
/// Unique on (buyer, share); created once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub share_id: ShareId,
    pub buyer_id: UserId,

    /// Copied from the share owner for seller-side queries.
    pub seller_id: UserId,

    /// The buyer's independent copy of the contact.
    pub copied_contact_id: ContactId,

    pub payment_id: Option<PaymentId>,
    pub amount_paid: Money,
    pub created_at: Timestamp,
}

impl Purchase {
    /// Prepares a purchase row for `buyer`. The copy id is assigned up
    /// front so the snapshot and the row can be written in one transaction.
    pub fn prepare(
        share: &Share,
        buyer_id: UserId,
        payment_id: Option<PaymentId>,
        amount_paid: Money,
    ) -> Self {
        Self {
            id: PurchaseId::new(),
            share_id: share.id,
            buyer_id,
            seller_id: share.owner_id,
            copied_contact_id: ContactId::new(),
            payment_id,
            amount_paid,
            created_at: Timestamp::now(),
        }
    }
}
