//! Contact Exchange API server.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use contact_exchange::adapters::http::{
    api_router, AppState, HttpSettings, Repositories, ServiceSettings,
};
use contact_exchange::adapters::memory::{
    InMemoryCheckoutSessionRepository, InMemoryContactStore, InMemoryIdentityStore,
    InMemoryPaymentLedger, InMemoryPurchaseRepository, InMemoryShareRepository,
    InMemorySubscriptionRepository, MemoryDatabase,
};
use contact_exchange::adapters::postgres::{
    PostgresCheckoutSessionRepository, PostgresContactStore, PostgresIdentityStore,
    PostgresPaymentLedger, PostgresPurchaseRepository, PostgresShareRepository,
    PostgresSubscriptionRepository,
};
use contact_exchange::adapters::{
    FixedRateConverter, TelegramStarsAdapter, TelegramStarsConfig, YooKassaConfig,
    YooKassaPaymentAdapter,
};
use contact_exchange::application::ProviderRegistry;
use contact_exchange::config::{AppConfig, DatabaseConfig, PaymentConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config);

    info!(
        environment = ?config.server.environment,
        storage = ?config.database.storage,
        "Starting contact exchange"
    );

    let repos = build_repositories(&config.database).await?;
    let providers = build_providers(&config.payment);
    if providers.configured().is_empty() {
        warn!("No payment provider configured; paid checkouts will fail");
    }
    let converter = FixedRateConverter::new(config.payment.stars_per_currency_unit)?;

    let mut settings = ServiceSettings::new(
        config.sharing.bot_username.clone(),
        config.sharing.grace_days,
        config.sharing.plan_terms()?,
    );
    settings.max_public_page = config.sharing.max_public_page;
    settings.checkout_timeout = config.payment.checkout_timeout();

    let state = AppState::new(repos, providers, Arc::new(converter), settings);
    let http = HttpSettings {
        request_timeout: config.server.request_timeout(),
        cors_origins: config.server.cors_origins_list(),
    };
    let app = api_router(state, &http);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` overrides
/// the configured filter.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

async fn build_repositories(config: &DatabaseConfig) -> anyhow::Result<Repositories> {
    if config.is_memory() {
        warn!("Using in-memory storage; all data is lost on restart");
        let db = MemoryDatabase::new();
        return Ok(Repositories {
            shares: Arc::new(InMemoryShareRepository::new(db.clone())),
            contacts: Arc::new(InMemoryContactStore::new(db.clone())),
            identities: Arc::new(InMemoryIdentityStore::new(db.clone())),
            ledger: Arc::new(InMemoryPaymentLedger::new(db.clone())),
            purchases: Arc::new(InMemoryPurchaseRepository::new(db.clone())),
            subscriptions: Arc::new(InMemorySubscriptionRepository::new(db.clone())),
            sessions: Arc::new(InMemoryCheckoutSessionRepository::new(db)),
        });
    }

    let pool = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(&config.url)
        .await
        .context("failed to connect to PostgreSQL")?;

    if config.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run migrations")?;
        info!("Migrations applied");
    }

    Ok(Repositories {
        shares: Arc::new(PostgresShareRepository::new(pool.clone())),
        contacts: Arc::new(PostgresContactStore::new(pool.clone())),
        identities: Arc::new(PostgresIdentityStore::new(pool.clone())),
        ledger: Arc::new(PostgresPaymentLedger::new(pool.clone())),
        purchases: Arc::new(PostgresPurchaseRepository::new(pool.clone())),
        subscriptions: Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
        sessions: Arc::new(PostgresCheckoutSessionRepository::new(pool)),
    })
}

fn build_providers(config: &PaymentConfig) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();

    if let (true, Some(shop_id), Some(secret_key)) = (
        config.yookassa_enabled(),
        config.yookassa_shop_id.as_ref(),
        config.yookassa_secret_key.clone(),
    ) {
        let mut yookassa =
            YooKassaConfig::new(shop_id.clone(), secret_key, config.yookassa_return_url.clone());
        if let Some(secret) = config.yookassa_webhook_secret.clone() {
            yookassa = yookassa.with_webhook_secret(secret);
        } else {
            warn!("YooKassa webhook secret not set; notifications are accepted unsigned");
        }
        registry = registry.with(Arc::new(YooKassaPaymentAdapter::new(yookassa)));
        info!("YooKassa provider enabled");
    }

    if config.telegram_enabled() {
        if let Some(token) = config.telegram_bot_token.clone() {
            let mut telegram = TelegramStarsConfig::new(token);
            if let Some(secret) = config.telegram_webhook_secret_token.clone() {
                telegram = telegram.with_webhook_secret_token(secret);
            }
            registry = registry.with(Arc::new(TelegramStarsAdapter::new(telegram)));
            info!("Telegram Stars provider enabled");
        }
    }

    registry
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
