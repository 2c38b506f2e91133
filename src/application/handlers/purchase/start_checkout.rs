//! Checkout handlers - open a payment and hand the buyer a provider page.
//!
//! A checkout opens a Pending intent, asks the provider for a hosted
//! confirmation page under a bounded timeout, and stores the correlation id
//! and page URL on the intent before returning. A buyer who clicks "buy"
//! again while the session is open gets the same page back.
//!
//! A provider failure or timeout leaves the intent Pending; a later webhook
//! or status poll resolves it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::application::handlers::sharing::ShareLocator;
use crate::application::ProviderRegistry;
use crate::domain::foundation::{DomainError, ErrorCode, Money, PaymentId, Timestamp, UserId};
use crate::domain::payment::{PaymentIntent, PaymentStatus, PaymentTarget, Provider};
use crate::domain::purchase::{CheckoutSession, CheckoutTarget};
use crate::domain::sharing::Visibility;
use crate::domain::subscription::PlanTerms;
use crate::ports::{
    CheckoutRequest, CheckoutSessionRepository, PaymentError, PaymentLedgerRepository,
    PriceConverter, PurchaseRepository, ShareRepository, SubscriptionRepository,
};

/// Default bound on a provider checkout call.
pub const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default lifetime of a reusable checkout session.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 30 * 60;

/// Result of starting a checkout.
#[derive(Debug, Clone)]
pub struct CheckoutResult {
    pub payment_id: PaymentId,
    pub provider: Provider,
    pub confirmation_url: String,
    /// Amount in the provider's settlement currency.
    pub amount: Money,
    /// True when an open session's page was handed back.
    pub reused: bool,
}

/// Shared machinery of both checkout kinds.
pub struct CheckoutRunner {
    ledger: Arc<dyn PaymentLedgerRepository>,
    sessions: Arc<dyn CheckoutSessionRepository>,
    providers: ProviderRegistry,
    converter: Arc<dyn PriceConverter>,
    timeout: Duration,
    session_ttl_secs: i64,
}

impl CheckoutRunner {
    pub fn new(
        ledger: Arc<dyn PaymentLedgerRepository>,
        sessions: Arc<dyn CheckoutSessionRepository>,
        providers: ProviderRegistry,
        converter: Arc<dyn PriceConverter>,
    ) -> Self {
        Self {
            ledger,
            sessions,
            providers,
            converter,
            timeout: DEFAULT_CHECKOUT_TIMEOUT,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_session_ttl_secs(mut self, ttl: i64) -> Self {
        self.session_ttl_secs = ttl;
        self
    }

    async fn run(
        &self,
        buyer_id: UserId,
        session_target: CheckoutTarget,
        payment_target: PaymentTarget,
        provider: Provider,
        price: Money,
        description: String,
    ) -> Result<CheckoutResult, DomainError> {
        let now = Timestamp::now();

        if let Some(reused) = self.reusable(&buyer_id, &session_target, provider, now).await? {
            return Ok(reused);
        }

        let adapter = self.providers.require(provider)?;
        let amount = match provider.settlement_currency() {
            Some(currency) => self.converter.convert(price, currency)?,
            None => price,
        };
        if amount.is_zero() {
            return Err(DomainError::validation("price", "Nothing to pay for"));
        }

        let mut intent = PaymentIntent::open(
            buyer_id,
            payment_target,
            provider,
            amount,
            Some(description.clone()),
        );
        self.ledger.save(&intent).await?;

        let request = CheckoutRequest {
            payment_id: intent.id,
            payer_id: buyer_id,
            purpose: intent.purpose(),
            amount,
            description,
        };

        let checkout = match tokio::time::timeout(self.timeout, adapter.create_checkout(request)).await
        {
            Ok(Ok(checkout)) => checkout,
            Ok(Err(e)) => {
                warn!(payment_id = %intent.id, provider = %provider, error = %e, "Checkout creation failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(
                    payment_id = %intent.id,
                    provider = %provider,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Checkout creation timed out"
                );
                return Err(PaymentError::timeout("Payment provider did not answer in time").into());
            }
        };

        let confirmation_url = checkout.confirmation_url.clone();
        intent.attach_checkout(
            checkout.correlation_id,
            Some(checkout.confirmation_url),
            Some(checkout.raw),
        );
        self.ledger.update_checkout(&intent).await?;

        let session = CheckoutSession::start(
            buyer_id,
            session_target,
            intent.id,
            now,
            self.session_ttl_secs,
        );
        self.sessions.upsert(&session).await?;

        info!(
            payment_id = %intent.id,
            provider = %provider,
            purpose = %intent.purpose(),
            amount = %amount,
            "Checkout started"
        );

        Ok(CheckoutResult {
            payment_id: intent.id,
            provider,
            confirmation_url,
            amount,
            reused: false,
        })
    }

    /// An unexpired session whose intent is still Pending with a page.
    async fn reusable(
        &self,
        buyer_id: &UserId,
        target: &CheckoutTarget,
        provider: Provider,
        now: Timestamp,
    ) -> Result<Option<CheckoutResult>, DomainError> {
        let Some(session) = self.sessions.find(buyer_id, target).await? else {
            return Ok(None);
        };
        if session.is_expired(now) {
            self.sessions.delete(buyer_id, target).await?;
            return Ok(None);
        }
        let Some(intent) = self.ledger.find_by_id(&session.payment_id).await? else {
            return Ok(None);
        };
        if intent.status != PaymentStatus::Pending || intent.provider != provider {
            return Ok(None);
        }
        let Some(confirmation_url) = intent.confirmation_url.clone() else {
            return Ok(None);
        };

        debug!(payment_id = %intent.id, "Reusing open checkout session");
        Ok(Some(CheckoutResult {
            payment_id: intent.id,
            provider,
            confirmation_url,
            amount: intent.amount,
            reused: true,
        }))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Share checkout
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct StartShareCheckoutCommand {
    pub buyer_id: UserId,
    pub locator: ShareLocator,
    pub provider: Provider,
}

pub struct StartShareCheckoutHandler {
    shares: Arc<dyn ShareRepository>,
    purchases: Arc<dyn PurchaseRepository>,
    runner: Arc<CheckoutRunner>,
}

impl StartShareCheckoutHandler {
    pub fn new(
        shares: Arc<dyn ShareRepository>,
        purchases: Arc<dyn PurchaseRepository>,
        runner: Arc<CheckoutRunner>,
    ) -> Self {
        Self {
            shares,
            purchases,
            runner,
        }
    }

    pub async fn handle(&self, cmd: StartShareCheckoutCommand) -> Result<CheckoutResult, DomainError> {
        let share = cmd.locator.resolve_active(self.shares.as_ref()).await?;

        if share.is_owned_by(&cmd.buyer_id) {
            return Err(DomainError::validation("share", "You cannot purchase your own share"));
        }
        if !share.requires_payment() {
            return Err(DomainError::validation("share", "This share does not require payment"));
        }
        if share.visibility == Visibility::Restricted && !share.can_view(&cmd.buyer_id, false) {
            return Err(DomainError::forbidden("This share is restricted"));
        }
        if self
            .purchases
            .find_by_buyer_and_share(&cmd.buyer_id, &share.id)
            .await?
            .is_some()
        {
            return Err(DomainError::new(
                ErrorCode::AlreadyPurchased,
                "You already own this contact",
            ));
        }

        let description = match &share.description {
            Some(text) => format!("Contact: {}", text),
            None => "Contact purchase".to_string(),
        };

        self.runner
            .run(
                cmd.buyer_id,
                CheckoutTarget::Share { share_id: share.id },
                PaymentTarget::Share { share_id: share.id },
                cmd.provider,
                share.price,
                description,
            )
            .await
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Subscription checkout
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct StartSubscriptionCheckoutCommand {
    pub user_id: UserId,
    pub provider: Provider,
}

pub struct StartSubscriptionCheckoutHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    runner: Arc<CheckoutRunner>,
    terms: PlanTerms,
}

impl StartSubscriptionCheckoutHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        runner: Arc<CheckoutRunner>,
        terms: PlanTerms,
    ) -> Self {
        Self {
            subscriptions,
            runner,
            terms,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartSubscriptionCheckoutCommand,
    ) -> Result<CheckoutResult, DomainError> {
        let existing = self.subscriptions.find_by_user(&cmd.user_id).await?;

        self.runner
            .run(
                cmd.user_id,
                CheckoutTarget::Subscription,
                PaymentTarget::Subscription {
                    plan: self.terms.plan,
                    subscription_id: existing.map(|s| s.id),
                },
                cmd.provider,
                self.terms.price,
                format!("{} plan, {} days", self.terms.plan, self.terms.billing_cycle_days),
            )
            .await
    }
}
