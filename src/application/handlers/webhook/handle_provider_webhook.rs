//! HandleProviderWebhookHandler - `POST /webhooks/{provider}`.
//!
//! Authenticates and parses the delivery with the provider's adapter, then
//! hands the event to the [`PaymentSettler`]. Unknown payments and events
//! without a status are acknowledged; anything we failed to process is an
//! error so the provider retries.

use std::sync::Arc;

use http::HeaderMap;
use tracing::{error, warn};

use crate::application::ProviderRegistry;
use crate::domain::payment::Provider;
use crate::domain::webhook::WebhookError;

use super::settle_payment::{PaymentSettler, ReconcileOutcome};

#[derive(Debug, Clone)]
pub struct HandleProviderWebhookCommand {
    /// Path segment naming the provider.
    pub provider: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

pub struct HandleProviderWebhookHandler {
    providers: ProviderRegistry,
    settler: Arc<PaymentSettler>,
}

impl HandleProviderWebhookHandler {
    pub fn new(providers: ProviderRegistry, settler: Arc<PaymentSettler>) -> Self {
        Self { providers, settler }
    }

    pub async fn handle(
        &self,
        cmd: HandleProviderWebhookCommand,
    ) -> Result<ReconcileOutcome, WebhookError> {
        let provider: Provider = cmd
            .provider
            .parse()
            .map_err(|_| WebhookError::UnknownProvider(cmd.provider.clone()))?;
        let adapter = self
            .providers
            .get(provider)
            .ok_or_else(|| WebhookError::UnknownProvider(cmd.provider.clone()))?;

        let event = match adapter.parse_webhook(&cmd.headers, &cmd.body) {
            Ok(Some(event)) => event,
            Ok(None) => {
                return Ok(ReconcileOutcome::Ignored {
                    event: "non_payment_update".to_string(),
                })
            }
            Err(e) => {
                warn!(provider = %provider, error = %e, "Rejected webhook delivery");
                return Err(e);
            }
        };

        let correlation_id = event.correlation_id.clone();
        self.settler.apply(provider, event).await.map_err(|e| {
            error!(
                provider = %provider,
                correlation_id = %correlation_id,
                error = %e,
                "Webhook processing failed"
            );
            WebhookError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_provider::{MockPaymentProvider, MOCK_SIGNATURE_HEADER};
    use crate::application::handlers::purchase::PurchaseShareHandler;
    use crate::application::handlers::test_support::{rub, Fixture};
    use crate::domain::foundation::UserId;
    use crate::domain::payment::{PaymentIntent, PaymentStatus, PaymentTarget};
    use crate::domain::sharing::Visibility;
    use crate::domain::subscription::{Plan, PlanTerms};
    use crate::domain::webhook::HmacBodyVerifier;
    use crate::ports::{PaymentLedgerRepository, PurchaseRepository};
    use serde_json::json;

    fn handler(fx: &Fixture, mock: MockPaymentProvider) -> HandleProviderWebhookHandler {
        let purchase = Arc::new(PurchaseShareHandler::new(
            fx.shares.clone(),
            fx.contacts.clone(),
            fx.purchases.clone(),
            fx.ledger.clone(),
        ));
        let settler = Arc::new(PaymentSettler::new(
            fx.ledger.clone(),
            fx.subscriptions.clone(),
            purchase,
            PlanTerms { plan: Plan::Seller, price: rub(990), billing_cycle_days: 30 },
        ));
        HandleProviderWebhookHandler::new(ProviderRegistry::new().with(Arc::new(mock)), settler)
    }

    fn command(provider: &str, body: serde_json::Value) -> HandleProviderWebhookCommand {
        HandleProviderWebhookCommand {
            provider: provider.to_string(),
            headers: HeaderMap::new(),
            body: serde_json::to_vec(&body).unwrap(),
        }
    }

    #[tokio::test]
    async fn unconfigured_provider_is_unknown() {
        let fx = Fixture::new();
        let h = handler(&fx, MockPaymentProvider::new(Provider::YooKassa));

        let err = h
            .handle(command("telegram", json!({"event": "payment.succeeded", "payment_id": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookError::UnknownProvider(_)));

        let err = h.handle(command("paypal", json!({}))).await.unwrap_err();
        assert!(matches!(err, WebhookError::UnknownProvider(_)));
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let fx = Fixture::new();
        let h = handler(&fx, MockPaymentProvider::new(Provider::YooKassa));
        let err = h
            .handle(HandleProviderWebhookCommand {
                provider: "yookassa".into(),
                headers: HeaderMap::new(),
                body: b"not json".to_vec(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_signature_is_rejected_without_state_change() {
        let fx = Fixture::new();
        let share = fx.seed_share(UserId::new(), Visibility::Paid, rub(500)).await;
        let mut intent = PaymentIntent::open(
            UserId::new(),
            PaymentTarget::Share { share_id: share.id },
            Provider::YooKassa,
            rub(500),
            None,
        );
        fx.ledger.save(&intent).await.unwrap();
        intent.attach_checkout("yk_sig".into(), None, None);
        fx.ledger.update_checkout(&intent).await.unwrap();

        let h = handler(&fx, MockPaymentProvider::with_webhook_secret(Provider::YooKassa, "s3cret"));
        let body = json!({"event": "payment.succeeded", "payment_id": "yk_sig"});
        let mut cmd = command("yookassa", body);
        cmd.headers.insert(MOCK_SIGNATURE_HEADER, "00ff".parse().unwrap());

        let err = h.handle(cmd.clone()).await.unwrap_err();
        assert!(matches!(err, WebhookError::InvalidSignature));
        let stored = fx.ledger.find_by_id(&intent.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Pending);

        let signature = HmacBodyVerifier::new("s3cret").sign_hex(&cmd.body).unwrap();
        cmd.headers.insert(MOCK_SIGNATURE_HEADER, signature.parse().unwrap());
        let outcome = h.handle(cmd).await.unwrap();
        assert!(matches!(outcome, ReconcileOutcome::Applied { settled: true, .. }));
        assert!(fx
            .purchases
            .find_by_buyer_and_share(&intent.payer_id, &share.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn unknown_payment_is_acknowledged() {
        let fx = Fixture::new();
        let h = handler(&fx, MockPaymentProvider::new(Provider::YooKassa));
        let outcome = h
            .handle(command(
                "yookassa",
                json!({"event": "payment.succeeded", "payment_id": "someone_else"}),
            ))
            .await
            .unwrap();
        assert!(matches!(outcome, ReconcileOutcome::Unmatched { .. }));
    }
}
