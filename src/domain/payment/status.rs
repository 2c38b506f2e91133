//! Payment status state machine.
//!
//! Providers deliver webhooks at least once and in any order, so the ledger
//! never overwrites a status blindly. Every update goes through this table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Status of a payment intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Created, waiting for the provider.
    Pending,

    /// Money captured. Only a refund can follow.
    Succeeded,

    /// Abandoned or cancelled at the provider.
    Cancelled,

    /// Rejected by the provider.
    Failed,

    /// Returned to the payer after success.
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "succeeded" => Ok(PaymentStatus::Succeeded),
            "cancelled" | "canceled" => Ok(PaymentStatus::Cancelled),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown payment status '{}'", other),
            )),
        }
    }
}

impl StateMachine for PaymentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, target),
            (Pending, Succeeded) | (Pending, Cancelled) | (Pending, Failed) | (Succeeded, Refunded)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Pending => vec![Succeeded, Cancelled, Failed],
            Succeeded => vec![Refunded],
            Cancelled | Failed | Refunded => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TransitionOutcome;
    use proptest::prelude::*;
    use PaymentStatus::*;

    const ALL: [PaymentStatus; 5] = [Pending, Succeeded, Cancelled, Failed, Refunded];

    #[test]
    fn pending_can_transition_to_succeeded() {
        assert!(Pending.can_transition_to(&Succeeded));
    }

    #[test]
    fn succeeded_can_transition_to_refunded() {
        assert!(Succeeded.can_transition_to(&Refunded));
    }

    #[test]
    fn succeeded_cannot_transition_to_cancelled() {
        assert!(!Succeeded.can_transition_to(&Cancelled));
        assert_eq!(Succeeded.apply(Cancelled), TransitionOutcome::Rejected);
    }

    #[test]
    fn refunded_cannot_transition_to_succeeded() {
        assert!(!Refunded.can_transition_to(&Succeeded));
        assert_eq!(Refunded.apply(Succeeded), TransitionOutcome::Rejected);
    }

    #[test]
    fn pending_cannot_skip_to_refunded() {
        assert!(!Pending.can_transition_to(&Refunded));
    }

    #[test]
    fn terminal_statuses() {
        assert!(Cancelled.is_terminal());
        assert!(Failed.is_terminal());
        assert!(Refunded.is_terminal());
        assert!(!Pending.is_terminal());
        assert!(!Succeeded.is_terminal());
    }

    #[test]
    fn accepts_american_spelling_of_cancelled() {
        assert_eq!("canceled".parse::<PaymentStatus>().unwrap(), Cancelled);
    }

    #[test]
    fn status_strings_round_trip() {
        for status in ALL {
            assert_eq!(status.as_str().parse::<PaymentStatus>().unwrap(), status);
        }
    }

    fn any_status() -> impl Strategy<Value = PaymentStatus> {
        (0..ALL.len()).prop_map(|i| ALL[i])
    }

    proptest! {
        #[test]
        fn applying_any_sequence_twice_is_stable(events in proptest::collection::vec(any_status(), 0..12)) {
            let run = |seq: &[PaymentStatus]| {
                seq.iter().fold(Pending, |current, target| match current.apply(*target) {
                    TransitionOutcome::Moved(next) => next,
                    _ => current,
                })
            };
            let once = run(&events);
            let doubled: Vec<_> = events.iter().flat_map(|e| [*e, *e]).collect();
            prop_assert_eq!(once, run(&doubled));
        }

        #[test]
        fn terminal_status_never_moves(target in any_status()) {
            for terminal in [Cancelled, Failed, Refunded] {
                prop_assert!(!terminal.apply(target).is_moved());
            }
        }
    }
}
