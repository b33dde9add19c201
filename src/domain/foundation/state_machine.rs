//! Lifecycle graphs.
//!
//! A lifecycle enum lists its outgoing edges once; legality checks and
//! checked moves are derived from that list.

use super::ValidationError;

/// A finite lifecycle whose states are plain `Copy` values.
///
/// ```ignore
/// impl StateMachine for PaymentState {
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             New => vec![Prepared, Failed],
///             Prepared => vec![Authorized, Failed],
///             Authorized => vec![Paid, Failed],
///             Paid | Failed => vec![],
///         }
///     }
/// }
///
/// assert!(PaymentState::New.can_transition_to(&PaymentState::Prepared));
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Outgoing edges of this state.
    fn valid_transitions(&self) -> Vec<Self>;

    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// `target` if the edge exists.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if !self.can_transition_to(&target) {
            return Err(ValidationError::invalid_format(
                "state",
                format!("no edge {:?} -> {:?}", self, target),
            ));
        }
        Ok(target)
    }

    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
