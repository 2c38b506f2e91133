//! In-memory PaymentLedgerRepository.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, Timestamp, UserId};
use crate::domain::payment::{PaymentIntent, PaymentStatus, Provider};
use crate::ports::PaymentLedgerRepository;

use super::{conflict, MemoryDatabase};

pub struct InMemoryPaymentLedger {
    db: MemoryDatabase,
}

impl InMemoryPaymentLedger {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

fn not_found(id: &PaymentId) -> DomainError {
    DomainError::new(ErrorCode::PaymentNotFound, format!("Payment {} not found", id))
}

#[async_trait]
impl PaymentLedgerRepository for InMemoryPaymentLedger {
    async fn save(&self, intent: &PaymentIntent) -> Result<(), DomainError> {
        let mut tables = self.db.lock()?;
        if tables.payments.contains_key(&intent.id) {
            return Err(conflict("Payment already exists"));
        }
        tables.payments.insert(intent.id, intent.clone());
        Ok(())
    }

    async fn update_checkout(&self, intent: &PaymentIntent) -> Result<(), DomainError> {
        let mut tables = self.db.lock()?;
        if let Some(correlation_id) = &intent.correlation_id {
            let taken = tables.payments.values().any(|p| {
                p.id != intent.id
                    && p.provider == intent.provider
                    && p.correlation_id.as_ref() == Some(correlation_id)
            });
            if taken {
                return Err(conflict("Correlation id already assigned"));
            }
        }
        let stored = tables
            .payments
            .get_mut(&intent.id)
            .ok_or_else(|| not_found(&intent.id))?;
        stored.correlation_id = intent.correlation_id.clone();
        stored.confirmation_url = intent.confirmation_url.clone();
        stored.description = intent.description.clone();
        stored.target = intent.target;
        if intent.provider_payload.is_some() {
            stored.provider_payload = intent.provider_payload.clone();
        }
        stored.updated_at = intent.updated_at;
        Ok(())
    }

    async fn update_status(
        &self,
        intent: &PaymentIntent,
        expected: PaymentStatus,
    ) -> Result<bool, DomainError> {
        let mut tables = self.db.lock()?;
        let stored = tables
            .payments
            .get_mut(&intent.id)
            .ok_or_else(|| not_found(&intent.id))?;
        if stored.status != expected {
            return Ok(false);
        }
        stored.status = intent.status;
        stored.provider_payload = intent.provider_payload.clone();
        stored.updated_at = intent.updated_at;
        Ok(true)
    }

    async fn mark_settled(&self, id: &PaymentId, at: Timestamp) -> Result<bool, DomainError> {
        let mut tables = self.db.lock()?;
        let stored = tables.payments.get_mut(id).ok_or_else(|| not_found(id))?;
        if stored.settled_at.is_some() {
            return Ok(false);
        }
        stored.mark_settled(at);
        Ok(true)
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<PaymentIntent>, DomainError> {
        Ok(self.db.lock()?.payments.get(id).cloned())
    }

    async fn find_by_correlation_id(
        &self,
        provider: Provider,
        correlation_id: &str,
    ) -> Result<Option<PaymentIntent>, DomainError> {
        let tables = self.db.lock()?;
        Ok(tables
            .payments
            .values()
            .find(|p| p.provider == provider && p.correlation_id.as_deref() == Some(correlation_id))
            .cloned())
    }

    async fn list_by_payer(
        &self,
        payer_id: &UserId,
        limit: u32,
    ) -> Result<Vec<PaymentIntent>, DomainError> {
        let tables = self.db.lock()?;
        let mut intents: Vec<PaymentIntent> = tables
            .payments
            .values()
            .filter(|p| &p.payer_id == payer_id)
            .cloned()
            .collect();
        intents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        intents.truncate(limit as usize);
        Ok(intents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Currency, Money, ShareId};
    use crate::domain::payment::PaymentTarget;

    fn intent() -> PaymentIntent {
        PaymentIntent::open(
            UserId::new(),
            PaymentTarget::Share { share_id: ShareId::new() },
            Provider::YooKassa,
            Money::from_minor(1_000, Currency::Rub).unwrap(),
            None,
        )
    }

    #[tokio::test]
    async fn update_status_is_compare_and_set() {
        let ledger = InMemoryPaymentLedger::new(MemoryDatabase::new());
        let mut i = intent();
        ledger.save(&i).await.unwrap();

        i.apply_status(PaymentStatus::Succeeded, None);
        assert!(ledger.update_status(&i, PaymentStatus::Pending).await.unwrap());
        // Second writer still believes the row is pending
        assert!(!ledger.update_status(&i, PaymentStatus::Pending).await.unwrap());
    }

    #[tokio::test]
    async fn mark_settled_only_once() {
        let ledger = InMemoryPaymentLedger::new(MemoryDatabase::new());
        let i = intent();
        ledger.save(&i).await.unwrap();
        let now = Timestamp::now();
        assert!(ledger.mark_settled(&i.id, now).await.unwrap());
        assert!(!ledger.mark_settled(&i.id, now).await.unwrap());
    }

    #[tokio::test]
    async fn correlation_ids_are_unique_per_provider() {
        let ledger = InMemoryPaymentLedger::new(MemoryDatabase::new());
        let mut a = intent();
        let mut b = intent();
        ledger.save(&a).await.unwrap();
        ledger.save(&b).await.unwrap();

        a.attach_checkout("pay_1".into(), None, None);
        ledger.update_checkout(&a).await.unwrap();
        b.attach_checkout("pay_1".into(), None, None);
        let err = ledger.update_checkout(&b).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConcurrencyConflict);

        let found = ledger
            .find_by_correlation_id(Provider::YooKassa, "pay_1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, a.id);
        assert!(ledger
            .find_by_correlation_id(Provider::Telegram, "pay_1")
            .await
            .unwrap()
            .is_none());
    }
}
