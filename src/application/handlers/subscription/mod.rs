//! Subscription gate handlers.

mod cancel_subscription;
mod check_seller_access;
mod create_subscription;
mod expire_subscriptions;
mod get_subscription;
mod renew_subscription;

pub use cancel_subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
};
pub use check_seller_access::{CheckSellerAccessHandler, CheckSellerAccessQuery};
pub use create_subscription::{
    CreateSubscriptionCommand, CreateSubscriptionHandler, CreateSubscriptionResult,
};
pub use expire_subscriptions::{
    ListExpiringHandler, ListExpiringQuery, MarkExpiredCommand, MarkExpiredHandler,
    MarkExpiredResult, EXPIRY_REMINDER_DAYS,
};
pub use get_subscription::{GetSubscriptionHandler, GetSubscriptionQuery, SubscriptionView};
pub use renew_subscription::{
    RenewSubscriptionCommand, RenewSubscriptionHandler, RenewSubscriptionResult,
};
