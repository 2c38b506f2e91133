//! Shared fixtures for handler tests.

use std::sync::Arc;

use serde_json::json;

use crate::adapters::memory::{
    InMemoryCheckoutSessionRepository, InMemoryContactStore, InMemoryIdentityStore,
    InMemoryPaymentLedger, InMemoryPurchaseRepository, InMemoryShareRepository,
    InMemorySubscriptionRepository, MemoryDatabase,
};
use crate::domain::foundation::{ContactId, Currency, Money, Timestamp, UserId};
use crate::domain::payment::Provider;
use crate::domain::sharing::{ContactFields, Share, ShareSettings, Visibility};
use crate::domain::subscription::{Plan, Subscription};
use crate::ports::{ShareRepository, SubscriptionRepository, UserRecord};

pub const BOT: &str = "exchange_bot";

pub struct Fixture {
    pub db: MemoryDatabase,
    pub shares: Arc<InMemoryShareRepository>,
    pub contacts: Arc<InMemoryContactStore>,
    pub identities: Arc<InMemoryIdentityStore>,
    pub ledger: Arc<InMemoryPaymentLedger>,
    pub purchases: Arc<InMemoryPurchaseRepository>,
    pub subscriptions: Arc<InMemorySubscriptionRepository>,
    pub sessions: Arc<InMemoryCheckoutSessionRepository>,
}

impl Fixture {
    pub fn new() -> Self {
        let db = MemoryDatabase::new();
        Self {
            shares: Arc::new(InMemoryShareRepository::new(db.clone())),
            contacts: Arc::new(InMemoryContactStore::new(db.clone())),
            identities: Arc::new(InMemoryIdentityStore::new(db.clone())),
            ledger: Arc::new(InMemoryPaymentLedger::new(db.clone())),
            purchases: Arc::new(InMemoryPurchaseRepository::new(db.clone())),
            subscriptions: Arc::new(InMemorySubscriptionRepository::new(db.clone())),
            sessions: Arc::new(InMemoryCheckoutSessionRepository::new(db.clone())),
            db,
        }
    }

    /// A conference contact with every catalogue field filled in.
    pub fn seed_contact(&self, owner: UserId) -> ContactId {
        let fields: ContactFields = [
            ("name", json!("Anna Petrova")),
            ("company", json!("Northwind")),
            ("role", json!("CTO")),
            ("phone", json!("+7 900 000-00-00")),
            ("email", json!("anna@northwind.example")),
            ("telegram_username", json!("@anna_p")),
            ("what_looking_for", json!("Rust engineers")),
            ("can_help_with", json!("Cloud costs")),
            ("topics", json!(["infra", "hiring"])),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        self.contacts.insert(owner, fields).unwrap()
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

    pub async fn grant_seller(&self, user: UserId) -> Subscription {
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
        sub
    }

    /// Stores an active share directly, bypassing the publish handler.
    pub async fn seed_share(&self, owner: UserId, visibility: Visibility, price: Money) -> Share {
        let contact = self.seed_contact(owner);
        let settings = ShareSettings::new(
            visibility,
            Default::default(),
            None,
            Default::default(),
            price,
            None,
        )
        .unwrap();
        let share = Share::publish(contact, owner, settings);
        self.shares.save(&share).await.unwrap();
        share
    }
}

pub fn rub(major: i64) -> Money {
    Money::from_minor(major * 100, Currency::Rub).unwrap()
}
