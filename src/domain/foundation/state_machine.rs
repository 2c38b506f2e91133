//! State machine trait for status enums.
//!
//! Status enums declare their transition table once; callers then get
//! validated transitions and a saturating `apply` for free.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for PaymentStatus {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!((self, target), (Pending, Succeeded) | (Succeeded, Refunded))
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Pending => vec![Succeeded],
///             Succeeded => vec![Refunded],
///             Refunded => vec![],
///         }
///     }
/// }
///
/// let next = PaymentStatus::Pending.transition_to(PaymentStatus::Succeeded)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Applies a transition without failing.
    ///
    /// Re-applying the current state is `Unchanged`, a disallowed target is
    /// `Rejected`, and only an allowed move yields `Moved`.
    fn apply(&self, target: Self) -> TransitionOutcome<Self> {
        if *self == target {
            TransitionOutcome::Unchanged
        } else if self.can_transition_to(&target) {
            TransitionOutcome::Moved(target)
        } else {
            TransitionOutcome::Rejected
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

/// Result of [`StateMachine::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome<S> {
    /// The state moved to the contained target.
    Moved(S),
    /// Target equals the current state.
    Unchanged,
    /// Target is not reachable from the current state.
    Rejected,
}

impl<S> TransitionOutcome<S> {
    /// Returns true if the state actually changed.
    pub fn is_moved(&self) -> bool {
        matches!(self, TransitionOutcome::Moved(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Door {
        Open,
        Closed,
        Locked,
        Bricked,
    }

    impl StateMachine for Door {
        fn can_transition_to(&self, target: &Self) -> bool {
            use Door::*;
            matches!(
                (self, target),
                (Open, Closed) | (Closed, Open) | (Closed, Locked) | (Locked, Closed) | (_, Bricked)
            ) && *self != Bricked
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use Door::*;
            match self {
                Open => vec![Closed, Bricked],
                Closed => vec![Open, Locked, Bricked],
                Locked => vec![Closed, Bricked],
                Bricked => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        assert_eq!(Door::Open.transition_to(Door::Closed), Ok(Door::Closed));
    }

    #[test]
    fn transition_to_fails_for_invalid_transition() {
        assert!(Door::Open.transition_to(Door::Locked).is_err());
    }

    #[test]
    fn apply_same_state_is_unchanged() {
        assert_eq!(Door::Locked.apply(Door::Locked), TransitionOutcome::Unchanged);
        assert_eq!(Door::Bricked.apply(Door::Bricked), TransitionOutcome::Unchanged);
    }

    #[test]
    fn apply_disallowed_target_is_rejected() {
        assert_eq!(Door::Bricked.apply(Door::Open), TransitionOutcome::Rejected);
        assert!(!Door::Open.apply(Door::Locked).is_moved());
    }

    #[test]
    fn apply_allowed_target_moves() {
        assert_eq!(Door::Closed.apply(Door::Locked), TransitionOutcome::Moved(Door::Locked));
    }

    #[test]
    fn is_terminal_only_for_states_without_exits() {
        assert!(Door::Bricked.is_terminal());
        assert!(!Door::Open.is_terminal());
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for status in [Door::Open, Door::Closed, Door::Locked, Door::Bricked] {
            for valid_target in status.valid_transitions() {
                assert!(
                    status.can_transition_to(&valid_target),
                    "can_transition_to should return true for {:?} -> {:?}",
                    status,
                    valid_target
                );
            }
        }
    }
}
