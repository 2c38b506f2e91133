//! Purchase engine and checkout handlers.

mod purchase_queries;
mod purchase_share;
mod start_checkout;

pub use purchase_queries::{
    HasPurchasedHandler, HasPurchasedQuery, ListUserPurchasesHandler, ListUserPurchasesQuery,
    PURCHASE_HISTORY_LIMIT,
};
pub use purchase_share::{PurchaseShareCommand, PurchaseShareHandler, PurchaseShareResult};
pub use start_checkout::{
    CheckoutResult, CheckoutRunner, StartShareCheckoutCommand, StartShareCheckoutHandler,
    StartSubscriptionCheckoutCommand, StartSubscriptionCheckoutHandler, DEFAULT_CHECKOUT_TIMEOUT,
    DEFAULT_SESSION_TTL_SECS,
};
