//! PurchaseShareHandler - the purchase engine.
//!
//! Verifies access and settlement, then writes the buyer's independent
//! copy, the purchase row and the counter in one storage transaction. The
//! unique (buyer, share) constraint decides concurrent races; the loser gets
//! the winner's purchase back instead of an error.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::handlers::sharing::ShareLocator;
use crate::domain::foundation::{DomainError, ErrorCode, Money, PaymentId, UserId};
use crate::domain::payment::PaymentStatus;
use crate::domain::purchase::Purchase;
use crate::domain::sharing::{ContactSnapshot, Share, Visibility};
use crate::ports::{ContactStore, PaymentLedgerRepository, PurchaseRepository, ShareRepository};

#[derive(Debug, Clone)]
pub struct PurchaseShareCommand {
    pub locator: ShareLocator,
    pub buyer_id: UserId,
    /// Required for shares that need payment.
    pub payment_id: Option<PaymentId>,
}

#[derive(Debug, Clone)]
pub struct PurchaseShareResult {
    pub purchase: Purchase,
    /// False when the buyer already owned the share.
    pub newly_created: bool,
}

pub struct PurchaseShareHandler {
    shares: Arc<dyn ShareRepository>,
    contacts: Arc<dyn ContactStore>,
    purchases: Arc<dyn PurchaseRepository>,
    ledger: Arc<dyn PaymentLedgerRepository>,
}

impl PurchaseShareHandler {
    pub fn new(
        shares: Arc<dyn ShareRepository>,
        contacts: Arc<dyn ContactStore>,
        purchases: Arc<dyn PurchaseRepository>,
        ledger: Arc<dyn PaymentLedgerRepository>,
    ) -> Self {
        Self {
            shares,
            contacts,
            purchases,
            ledger,
        }
    }

    pub async fn handle(&self, cmd: PurchaseShareCommand) -> Result<PurchaseShareResult, DomainError> {
        let share = cmd.locator.resolve_active(self.shares.as_ref()).await?;

        if share.is_owned_by(&cmd.buyer_id) {
            return Err(DomainError::validation("share", "You cannot purchase your own share"));
        }

        if let Some(existing) = self.existing(&cmd.buyer_id, &share).await? {
            debug!(purchase_id = %existing.id, "Share already purchased");
            return Ok(PurchaseShareResult {
                purchase: existing,
                newly_created: false,
            });
        }

        if share.visibility == Visibility::Restricted && !share.can_view(&cmd.buyer_id, false) {
            return Err(DomainError::forbidden("This share is restricted"));
        }

        let (payment_id, amount_paid) = self.settlement(&share, &cmd).await?;

        let contact = self.contacts.get(&share.contact_id).await?.ok_or_else(|| {
            DomainError::new(ErrorCode::ContactNotFound, "Shared contact no longer exists")
        })?;
        let snapshot = ContactSnapshot::from_share(&share, &contact.fields);
        let purchase = Purchase::prepare(&share, cmd.buyer_id, payment_id, amount_paid);

        match self.purchases.record(&purchase, &snapshot).await {
            Ok(()) => {
                info!(
                    purchase_id = %purchase.id,
                    share_id = %share.id,
                    buyer_id = %purchase.buyer_id,
                    amount = %purchase.amount_paid,
                    "Share purchased"
                );
                Ok(PurchaseShareResult {
                    purchase,
                    newly_created: true,
                })
            }
            Err(e) if e.code == ErrorCode::ConcurrencyConflict => {
                debug!(share_id = %share.id, "Purchase raced, returning winner");
                let existing = self.existing(&cmd.buyer_id, &share).await?.ok_or(e)?;
                Ok(PurchaseShareResult {
                    purchase: existing,
                    newly_created: false,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn existing(&self, buyer_id: &UserId, share: &Share) -> Result<Option<Purchase>, DomainError> {
        self.purchases.find_by_buyer_and_share(buyer_id, &share.id).await
    }

    /// Free shares settle at zero; paid shares need a succeeded payment by
    /// this buyer for this share.
    async fn settlement(
        &self,
        share: &Share,
        cmd: &PurchaseShareCommand,
    ) -> Result<(Option<PaymentId>, Money), DomainError> {
        if !share.requires_payment() {
            return Ok((None, Money::zero(share.price.currency)));
        }

        let payment_required = || {
            DomainError::new(ErrorCode::PaymentRequired, "A completed payment is required")
                .with_detail("share_id", share.id.to_string())
        };

        let payment_id = cmd.payment_id.ok_or_else(payment_required)?;
        let intent = self
            .ledger
            .find_by_id(&payment_id)
            .await?
            .ok_or_else(payment_required)?;

        let matches = intent.status == PaymentStatus::Succeeded
            && intent.payer_id == cmd.buyer_id
            && intent.target.share_id() == Some(share.id);
        if !matches {
            return Err(payment_required().with_detail("payment_status", intent.status.to_string()));
        }

        Ok((Some(intent.id), intent.amount))
    }
}
