//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `ShareRepository` - Shares with atomic view/purchase counters
//! - `PaymentLedgerRepository` - Payment intents with compare-and-set status
//! - `PurchaseRepository` - Transactional purchase + snapshot writes
//! - `SubscriptionRepository` - Seller subscriptions
//! - `CheckoutSessionRepository` - Pending checkout per (buyer, target)
//!
//! ## Collaborator Ports
//!
//! - `ContactStore` - Read contacts, write buyer copies
//! - `IdentityStore` - User display info
//!
//! ## Payment Ports
//!
//! - `PaymentProvider` - Checkout creation, status polling, webhook parsing
//! - `PriceConverter` - Currency conversion policy

mod checkout_session_repository;
mod contact_store;
mod identity_store;
mod payment_ledger;
mod payment_provider;
mod price_converter;
mod purchase_repository;
mod share_repository;
mod subscription_repository;

pub use checkout_session_repository::CheckoutSessionRepository;
pub use contact_store::{ContactRecord, ContactStore};
pub use identity_store::{IdentityStore, UserRecord};
pub use payment_ledger::PaymentLedgerRepository;
pub use payment_provider::{
    CheckoutRequest, PaymentError, PaymentErrorCode, PaymentProvider, ProviderCheckout,
};
pub use price_converter::PriceConverter;
pub use purchase_repository::PurchaseRepository;
pub use share_repository::ShareRepository;
pub use subscription_repository::SubscriptionRepository;
