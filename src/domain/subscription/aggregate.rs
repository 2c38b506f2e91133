//! Subscription aggregate - a seller's recurring billing record.
//!
//! # Design Decisions
//!
//! - **One per user**: unique constraint on user_id at the storage layer
//! - **Renewal is not cumulative**: a renewal sets the period to
//!   `[now, now + cycle)`, so applying it twice at once is harmless
//! - **Grace window**: access outlives `current_period_end` by a fixed
//!   number of days to absorb renewal-payment latency

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, Money, StateMachine, SubscriptionId, Timestamp, TransitionOutcome,
    UserId,
};
use crate::domain::payment::Provider;

use super::{Plan, SubscriptionStatus};

/// Days added to the period end before seller access lapses.
pub const DEFAULT_GRACE_DAYS: i64 = 3;

/// A seller's recurring subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub provider: Provider,

    /// Price charged per cycle.
    pub price: Money,

    pub billing_cycle_days: i64,
    pub current_period_start: Timestamp,
    pub current_period_end: Timestamp,

    /// When the next charge is due. Cleared on cancellation.
    pub next_payment_at: Option<Timestamp>,

    pub cancelled_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Starts a subscription with period `[now, now + cycle)`.
    pub fn create(
        user_id: UserId,
        plan: Plan,
        provider: Provider,
        price: Money,
        billing_cycle_days: i64,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        if billing_cycle_days <= 0 {
            return Err(DomainError::validation(
                "billing_cycle_days",
                "Billing cycle must be at least one day",
            ));
        }
        let end = now.add_days(billing_cycle_days);
        Ok(Self {
            id: SubscriptionId::new(),
            user_id,
            plan,
            status: SubscriptionStatus::Active,
            provider,
            price,
            billing_cycle_days,
            current_period_start: now,
            current_period_end: end,
            next_payment_at: Some(end),
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Starts a fresh period of one cycle from `now` and reactivates.
    pub fn renew(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Active)?;
        let end = now.add_days(self.billing_cycle_days);
        self.current_period_start = now;
        self.current_period_end = end;
        self.next_payment_at = Some(end);
        self.cancelled_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// Cancels; access remains until the period end.
    pub fn cancel(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Cancelled)?;
        self.cancelled_at.get_or_insert(now);
        self.next_payment_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// Marks the subscription expired.
    pub fn mark_expired(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Expired)?;
        self.next_payment_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// Whether the user may publish paid shares at `now`.
    ///
    /// True while Active inside the period, or at any status before the
    /// grace window closes. Plans without seller rights never qualify.
    pub fn has_seller_access(&self, now: Timestamp, grace_days: i64) -> bool {
        if !self.plan.grants_seller_access() {
            return false;
        }
        let in_period = now.is_before(&self.current_period_end);
        let in_grace = now.is_before(&self.current_period_end.add_days(grace_days));
        (self.status == SubscriptionStatus::Active && in_period) || in_grace
    }

    /// True if the period ends within `days` of `now` and has not ended yet.
    pub fn expires_within(&self, now: Timestamp, days: i64) -> bool {
        self.status == SubscriptionStatus::Active
            && !now.is_after(&self.current_period_end)
            && self.current_period_end.is_before(&now.add_days(days))
    }

    /// Same-status transitions are accepted as no-ops.
    fn transition_to(&mut self, target: SubscriptionStatus) -> Result<(), DomainError> {
        match self.status.apply(target) {
            TransitionOutcome::Moved(next) => {
                self.status = next;
                Ok(())
            }
            TransitionOutcome::Unchanged => Ok(()),
            TransitionOutcome::Rejected => Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot move subscription from {} to {}", self.status, target),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Currency;

    fn t0() -> Timestamp {
        Timestamp::from_datetime(
            chrono::DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&chrono::Utc),
        )
    }

    fn seller_sub() -> Subscription {
        Subscription::create(
            UserId::new(),
            Plan::Seller,
            Provider::YooKassa,
            Money::from_minor(99_000, Currency::Rub).unwrap(),
            30,
            t0(),
        )
        .unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // Creation and renewal
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn create_sets_one_cycle_period() {
        let sub = seller_sub();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.current_period_start, t0());
        assert_eq!(sub.current_period_end, t0().add_days(30));
        assert_eq!(sub.next_payment_at, Some(t0().add_days(30)));
    }

    #[test]
    fn create_rejects_zero_cycle() {
        let result = Subscription::create(
            UserId::new(),
            Plan::Seller,
            Provider::YooKassa,
            Money::zero(Currency::Rub),
            0,
            t0(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn renew_extends_from_now_and_reactivates() {
        let mut sub = seller_sub();
        sub.cancel(t0().add_days(10)).unwrap();
        let later = t0().add_days(45);
        sub.renew(later).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.current_period_start, later);
        assert_eq!(sub.current_period_end, later.add_days(30));
        assert!(sub.cancelled_at.is_none());
    }

    #[test]
    fn renew_twice_at_same_instant_is_stable() {
        let mut sub = seller_sub();
        let now = t0().add_days(29);
        sub.renew(now).unwrap();
        let once = sub.clone();
        sub.renew(now).unwrap();
        assert_eq!(sub, once);
    }

    #[test]
    fn cancel_keeps_access_until_period_end() {
        let mut sub = seller_sub();
        sub.cancel(t0().add_days(1)).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Cancelled);
        assert!(sub.has_seller_access(t0().add_days(29), DEFAULT_GRACE_DAYS));
        assert!(sub.next_payment_at.is_none());
    }

    #[test]
    fn expired_subscription_cannot_be_cancelled() {
        let mut sub = seller_sub();
        sub.mark_expired(t0().add_days(40)).unwrap();
        let err = sub.cancel(t0().add_days(41)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }

    // ══════════════════════════════════════════════════════════════
    // Seller access and grace window
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn access_one_second_before_period_end() {
        let sub = seller_sub();
        let end = sub.current_period_end;
        assert!(sub.has_seller_access(end.minus_secs(1), DEFAULT_GRACE_DAYS));
    }

    #[test]
    fn access_one_second_before_grace_closes() {
        let sub = seller_sub();
        let grace_end = sub.current_period_end.add_days(DEFAULT_GRACE_DAYS);
        assert!(sub.has_seller_access(grace_end.minus_secs(1), DEFAULT_GRACE_DAYS));
    }

    #[test]
    fn no_access_one_second_after_grace_closes() {
        let sub = seller_sub();
        let grace_end = sub.current_period_end.add_days(DEFAULT_GRACE_DAYS);
        assert!(!sub.has_seller_access(grace_end.plus_secs(1), DEFAULT_GRACE_DAYS));
    }

    #[test]
    fn free_plan_never_grants_seller_access() {
        let mut sub = seller_sub();
        sub.plan = Plan::Free;
        assert!(!sub.has_seller_access(t0().add_days(1), DEFAULT_GRACE_DAYS));
    }

    #[test]
    fn expires_within_finds_period_ending_soon() {
        let sub = seller_sub();
        assert!(sub.expires_within(t0().add_days(28), 3));
        assert!(!sub.expires_within(t0().add_days(10), 3));
        assert!(!sub.expires_within(t0().add_days(31), 3));
    }
}
