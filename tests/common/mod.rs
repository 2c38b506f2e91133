//! In-memory application harness shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use contact_exchange::adapters::http::{
    api_router, AppState, HttpSettings, Repositories, ServiceSettings, USER_ID_HEADER,
};
use contact_exchange::adapters::memory::{
    InMemoryCheckoutSessionRepository, InMemoryContactStore, InMemoryIdentityStore,
    InMemoryPaymentLedger, InMemoryPurchaseRepository, InMemoryShareRepository,
    InMemorySubscriptionRepository, MemoryDatabase,
};
use contact_exchange::adapters::{FixedRateConverter, MockPaymentProvider};
use contact_exchange::application::ProviderRegistry;
use contact_exchange::domain::foundation::{ContactId, Currency, Money, Timestamp, UserId};
use contact_exchange::domain::payment::Provider;
use contact_exchange::domain::sharing::ContactFields;
use contact_exchange::domain::subscription::{Plan, PlanTerms, Subscription};
use contact_exchange::ports::{SubscriptionRepository, UserRecord};

pub const BOT: &str = "exchange_bot";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub contacts: Arc<InMemoryContactStore>,
    pub identities: Arc<InMemoryIdentityStore>,
    pub subscriptions: Arc<InMemorySubscriptionRepository>,
    pub yookassa: MockPaymentProvider,
}

pub fn rub(major: i64) -> Money {
    Money::from_minor(major * 100, Currency::Rub).unwrap()
}

impl TestApp {
    pub fn new() -> Self {
        let db = MemoryDatabase::new();
        let contacts = Arc::new(InMemoryContactStore::new(db.clone()));
        let identities = Arc::new(InMemoryIdentityStore::new(db.clone()));
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new(db.clone()));

        let repos = Repositories {
            shares: Arc::new(InMemoryShareRepository::new(db.clone())),
            contacts: contacts.clone(),
            identities: identities.clone(),
            ledger: Arc::new(InMemoryPaymentLedger::new(db.clone())),
            purchases: Arc::new(InMemoryPurchaseRepository::new(db.clone())),
            subscriptions: subscriptions.clone(),
            sessions: Arc::new(InMemoryCheckoutSessionRepository::new(db)),
        };

        let yookassa = MockPaymentProvider::new(Provider::YooKassa);
        let providers = ProviderRegistry::new().with(Arc::new(yookassa.clone()));
        let terms = PlanTerms {
            plan: Plan::Seller,
            price: rub(990),
            billing_cycle_days: 30,
        };
        let state = AppState::new(
            repos,
            providers,
            Arc::new(FixedRateConverter::default()),
            ServiceSettings::new(BOT, 3, terms),
        );
        let router = api_router(state.clone(), &HttpSettings::default());

        Self {
            router,
            state,
            contacts,
            identities,
            subscriptions,
            yookassa,
        }
    }

    pub fn seed_user(&self, name: &str) -> UserId {
        let id = UserId::new();
        self.identities
            .insert(UserRecord {
                id,
                display_name: name.to_string(),
                username: Some(name.to_lowercase()),
            })
            .unwrap();
        id
    }

    pub fn seed_contact(&self, owner: UserId) -> ContactId {
        let fields: ContactFields = [
            ("name", json!("Anna Petrova")),
            ("company", json!("Northwind")),
            ("role", json!("CTO")),
            ("phone", json!("+7 900 000-00-00")),
            ("email", json!("anna@northwind.example")),
            ("what_looking_for", json!("Rust engineers")),
            ("topics", json!(["infra", "hiring"])),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        self.contacts.insert(owner, fields).unwrap()
    }

    pub async fn grant_seller(&self, user: UserId) {
        let sub = Subscription::create(
            user,
            Plan::Seller,
            Provider::YooKassa,
            rub(990),
            30,
            Timestamp::now(),
        )
        .unwrap();
        self.subscriptions.save(&sub).await.unwrap();
    }

    pub fn contact_count(&self, owner: UserId) -> usize {
        self.contacts.count_owned_by(&owner).unwrap()
    }

    /// Sends one request through the full middleware stack.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<UserId>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.dispatch(request).await
    }

    pub async fn post_webhook(&self, provider: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("/webhooks/{}", provider))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Publishes a share of a fresh contact and returns the owner's view.
    pub async fn publish(&self, owner: UserId, body: Value) -> Value {
        let contact = self.seed_contact(owner);
        let mut body = body;
        body["contact_id"] = json!(contact.to_string());
        let (status, share) = self.send(Method::POST, "/shares", Some(owner), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "publish failed: {}", share);
        share
    }
}

/// Mock provider notification for a checkout's payment id.
pub fn succeeded_webhook(payment_id: &str) -> Value {
    json!({
        "event": "payment.succeeded",
        "payment_id": MockPaymentProvider::correlation_id_for(&payment_id),
    })
}
