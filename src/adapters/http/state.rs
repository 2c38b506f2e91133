//! Shared application state.
//!
//! Handlers are built once at startup from the storage ports, the provider
//! registry and the service settings, then shared across requests.

use std::sync::Arc;
use std::time::Duration;

use crate::application::handlers::purchase::{
    CheckoutRunner, ListUserPurchasesHandler, PurchaseShareHandler, StartShareCheckoutHandler,
    StartSubscriptionCheckoutHandler, DEFAULT_CHECKOUT_TIMEOUT, DEFAULT_SESSION_TTL_SECS,
};
use crate::application::handlers::sharing::{
    BrowseShareHandler, DeactivateShareHandler, ListPublicSharesHandler, ListUserSharesHandler,
    PublishShareHandler, UpdateFieldVisibilityHandler, MAX_PUBLIC_PAGE,
};
use crate::application::handlers::subscription::{
    CancelSubscriptionHandler, CheckSellerAccessHandler, GetSubscriptionHandler,
};
use crate::application::handlers::webhook::{
    HandleProviderWebhookHandler, PaymentSettler, RefreshPaymentStatusHandler,
};
use crate::application::ProviderRegistry;
use crate::domain::subscription::PlanTerms;
use crate::ports::{
    CheckoutSessionRepository, ContactStore, IdentityStore, PaymentLedgerRepository,
    PriceConverter, PurchaseRepository, ShareRepository, SubscriptionRepository,
};

/// Every storage port, backed by one storage mode.
#[derive(Clone)]
pub struct Repositories {
    pub shares: Arc<dyn ShareRepository>,
    pub contacts: Arc<dyn ContactStore>,
    pub identities: Arc<dyn IdentityStore>,
    pub ledger: Arc<dyn PaymentLedgerRepository>,
    pub purchases: Arc<dyn PurchaseRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub sessions: Arc<dyn CheckoutSessionRepository>,
}

/// Business settings the handlers need.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Bot that deep links point at.
    pub bot_username: String,
    pub grace_days: i64,
    pub plan_terms: PlanTerms,
    pub max_public_page: u32,
    pub checkout_timeout: Duration,
    pub session_ttl_secs: i64,
}

impl ServiceSettings {
    pub fn new(bot_username: impl Into<String>, grace_days: i64, plan_terms: PlanTerms) -> Self {
        Self {
            bot_username: bot_username.into(),
            grace_days,
            plan_terms,
            max_public_page: MAX_PUBLIC_PAGE,
            checkout_timeout: DEFAULT_CHECKOUT_TIMEOUT,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

/// Shared application state containing all handlers.
///
/// Cloned for each request; every field is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub bot_username: Arc<str>,

    pub publish_share: Arc<PublishShareHandler>,
    pub browse_share: Arc<BrowseShareHandler>,
    pub update_fields: Arc<UpdateFieldVisibilityHandler>,
    pub deactivate_share: Arc<DeactivateShareHandler>,
    pub list_public_shares: Arc<ListPublicSharesHandler>,
    pub list_user_shares: Arc<ListUserSharesHandler>,

    pub purchase_share: Arc<PurchaseShareHandler>,
    pub list_purchases: Arc<ListUserPurchasesHandler>,
    pub share_checkout: Arc<StartShareCheckoutHandler>,
    pub subscription_checkout: Arc<StartSubscriptionCheckoutHandler>,

    pub get_subscription: Arc<GetSubscriptionHandler>,
    pub cancel_subscription: Arc<CancelSubscriptionHandler>,

    pub provider_webhook: Arc<HandleProviderWebhookHandler>,
    pub refresh_payment: Arc<RefreshPaymentStatusHandler>,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        providers: ProviderRegistry,
        converter: Arc<dyn PriceConverter>,
        settings: ServiceSettings,
    ) -> Self {
        let seller_access = Arc::new(CheckSellerAccessHandler::with_grace_days(
            repos.subscriptions.clone(),
            settings.grace_days,
        ));

        let purchase_share = Arc::new(PurchaseShareHandler::new(
            repos.shares.clone(),
            repos.contacts.clone(),
            repos.purchases.clone(),
            repos.ledger.clone(),
        ));

        let runner = Arc::new(
            CheckoutRunner::new(
                repos.ledger.clone(),
                repos.sessions.clone(),
                providers.clone(),
                converter,
            )
            .with_timeout(settings.checkout_timeout)
            .with_session_ttl_secs(settings.session_ttl_secs),
        );

        let settler = Arc::new(PaymentSettler::new(
            repos.ledger.clone(),
            repos.subscriptions.clone(),
            purchase_share.clone(),
            settings.plan_terms,
        ));

        Self {
            bot_username: Arc::from(settings.bot_username.as_str()),

            publish_share: Arc::new(PublishShareHandler::new(
                repos.shares.clone(),
                repos.contacts.clone(),
                seller_access,
                settings.bot_username.clone(),
            )),
            browse_share: Arc::new(BrowseShareHandler::new(
                repos.shares.clone(),
                repos.contacts.clone(),
                repos.purchases.clone(),
                repos.identities.clone(),
                settings.bot_username.clone(),
            )),
            update_fields: Arc::new(UpdateFieldVisibilityHandler::new(repos.shares.clone())),
            deactivate_share: Arc::new(DeactivateShareHandler::new(repos.shares.clone())),
            list_public_shares: Arc::new(ListPublicSharesHandler::with_max_page(
                repos.shares.clone(),
                settings.max_public_page,
            )),
            list_user_shares: Arc::new(ListUserSharesHandler::new(repos.shares.clone())),

            purchase_share,
            list_purchases: Arc::new(ListUserPurchasesHandler::new(repos.purchases.clone())),
            share_checkout: Arc::new(StartShareCheckoutHandler::new(
                repos.shares.clone(),
                repos.purchases.clone(),
                runner.clone(),
            )),
            subscription_checkout: Arc::new(StartSubscriptionCheckoutHandler::new(
                repos.subscriptions.clone(),
                runner,
                settings.plan_terms,
            )),

            get_subscription: Arc::new(GetSubscriptionHandler::with_grace_days(
                repos.subscriptions.clone(),
                settings.grace_days,
            )),
            cancel_subscription: Arc::new(CancelSubscriptionHandler::new(
                repos.subscriptions.clone(),
            )),

            provider_webhook: Arc::new(HandleProviderWebhookHandler::new(
                providers.clone(),
                settler.clone(),
            )),
            refresh_payment: Arc::new(
                RefreshPaymentStatusHandler::new(repos.ledger, providers, settler)
                    .with_timeout(settings.checkout_timeout),
            ),
        }
    }
}
