//! Lookup table from provider to its configured adapter.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::payment::Provider;
use crate::ports::PaymentProvider;

/// Configured payment provider adapters.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<Provider, Arc<dyn PaymentProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adapter under the provider it reports.
    pub fn with(mut self, adapter: Arc<dyn PaymentProvider>) -> Self {
        self.providers.insert(adapter.provider(), adapter);
        self
    }

    pub fn get(&self, provider: Provider) -> Option<Arc<dyn PaymentProvider>> {
        self.providers.get(&provider).cloned()
    }

    /// Like [`get`](Self::get) but an unconfigured provider is an error.
    pub fn require(&self, provider: Provider) -> Result<Arc<dyn PaymentProvider>, DomainError> {
        self.get(provider).ok_or_else(|| {
            DomainError::new(ErrorCode::ProviderError, "Payment provider is not configured")
                .with_detail("provider", provider.to_string())
        })
    }

    pub fn configured(&self) -> Vec<Provider> {
        self.providers.keys().copied().collect()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.configured())
            .finish()
    }
}
