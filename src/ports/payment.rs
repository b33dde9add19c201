//! Payment record port.
//!
//! The orchestrator owns payment records and their state machine. The gateway
//! adapter reads amounts and buyer data, asks whether transitions are
//! allowed, requests them, and stores gateway identifiers. It never decides
//! which states exist.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::payment::Transition;

/// Buyer data provided by the order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerInfo {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

/// Result of a requested transition that did not hard-fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The state machine moved.
    Applied,

    /// Not allowed from the current state. Nothing changed.
    Illegal,
}

/// Hard failure inside the state machine (storage, guards, callbacks).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Transition '{transition}' failed: {reason}")]
pub struct FsmError {
    pub transition: Transition,
    pub reason: String,
}

impl FsmError {
    pub fn new(transition: Transition, reason: impl Into<String>) -> Self {
        Self {
            transition,
            reason: reason.into(),
        }
    }
}

/// A payment record with its lifecycle state machine.
pub trait Payment: Send + Sync {
    /// Local identifier; sent to the gateway as `externalId`.
    fn id(&self) -> &str;

    fn amount_required(&self) -> Decimal;

    fn amount_paid(&self) -> Decimal;

    /// ISO 4217 code.
    fn currency(&self) -> &str;

    fn description(&self) -> &str;

    fn buyer(&self) -> BuyerInfo;

    /// Whether the state machine defines `transition` at all.
    fn supports(&self, _transition: Transition) -> bool {
        true
    }

    /// Whether `transition` may fire from the current state.
    fn can_transition(&self, transition: Transition) -> bool;

    /// Fires `transition`.
    ///
    /// Returns `Illegal` when the current state forbids it and `Err` only for
    /// hard failures.
    fn transition(&mut self, transition: Transition) -> Result<TransitionOutcome, FsmError>;

    /// Name of the current state, for logging.
    fn current_state(&self) -> &str;

    /// Gateway payment identifier.
    fn external_id(&self) -> Option<&str>;

    fn set_external_id(&mut self, external_id: String);

    /// Gateway refund identifier of the last refund started.
    fn external_refund_id(&self) -> Option<&str>;

    fn set_external_refund_id(&mut self, refund_id: String);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_is_object_safe() {
        fn _accepts_dyn(_payment: &dyn Payment) {}
    }

    #[test]
    fn fsm_error_names_transition() {
        let err = FsmError::new(Transition::MarkAsPaid, "row locked");
        assert_eq!(err.to_string(), "Transition 'mark_as_paid' failed: row locked");
    }
}
