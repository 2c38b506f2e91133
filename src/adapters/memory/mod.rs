//! In-memory storage adapters.
//!
//! All repositories share one [`MemoryDatabase`], the in-process analogue of
//! a connection pool. Multi-table operations take the single table lock, so
//! they are atomic the same way a Postgres transaction is, and uniqueness
//! rules mirror the SQL constraints.
//!
//! Used by tests and by the `memory` storage mode for local runs.

mod checkout_session_repository;
mod contact_store;
mod identity_store;
mod payment_ledger;
mod purchase_repository;
mod share_repository;
mod subscription_repository;

pub use checkout_session_repository::InMemoryCheckoutSessionRepository;
pub use contact_store::InMemoryContactStore;
pub use identity_store::InMemoryIdentityStore;
pub use payment_ledger::InMemoryPaymentLedger;
pub use purchase_repository::InMemoryPurchaseRepository;
pub use share_repository::InMemoryShareRepository;
pub use subscription_repository::InMemorySubscriptionRepository;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::foundation::{
    ContactId, DomainError, ErrorCode, PaymentId, PurchaseId, ShareId, SubscriptionId, UserId,
};
use crate::domain::payment::PaymentIntent;
use crate::domain::purchase::{CheckoutSession, Purchase};
use crate::domain::sharing::Share;
use crate::domain::subscription::Subscription;
use crate::ports::{ContactRecord, UserRecord};

/// Every table of the in-memory store.
#[derive(Default)]
pub(crate) struct Tables {
    pub shares: HashMap<ShareId, Share>,
    pub contacts: HashMap<ContactId, ContactRecord>,
    pub users: HashMap<UserId, UserRecord>,
    pub payments: HashMap<PaymentId, PaymentIntent>,
    pub purchases: HashMap<PurchaseId, Purchase>,
    pub subscriptions: HashMap<SubscriptionId, Subscription>,
    pub checkout_sessions: HashMap<(UserId, String), CheckoutSession>,
}

/// Shared handle to the in-memory tables.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Tables>, DomainError> {
        self.tables
            .lock()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "In-memory store lock poisoned"))
    }
}

fn conflict(message: impl Into<String>) -> DomainError {
    DomainError::new(ErrorCode::ConcurrencyConflict, message)
}

/// Clamps a page window onto a slice length.
fn page<T: Clone>(items: &[T], limit: u32, offset: u32) -> Vec<T> {
    items
        .iter()
        .skip(offset as usize)
        .take(limit as usize)
        .cloned()
        .collect()
}
