//! Payment lifecycle transitions and reference states.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Named transitions the adapter may request from the payment state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Gateway accepted the payment and the buyer was sent to the paywall.
    ConfirmPrepared,

    /// Gateway confirmed the buyer's payment.
    ConfirmPayment,

    /// Funds are settled; the order is paid.
    MarkAsPaid,

    /// Payment was rejected, errored, expired or abandoned.
    Fail,
}

impl Transition {
    pub const ALL: [Transition; 4] = [
        Transition::ConfirmPrepared,
        Transition::ConfirmPayment,
        Transition::MarkAsPaid,
        Transition::Fail,
    ];

    /// Transition name as understood by orchestrator state machines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::ConfirmPrepared => "confirm_prepared",
            Transition::ConfirmPayment => "confirm_payment",
            Transition::MarkAsPaid => "mark_as_paid",
            Transition::Fail => "fail",
        }
    }

    /// State reached when this transition fires in the reference lifecycle.
    pub fn target(&self) -> PaymentState {
        match self {
            Transition::ConfirmPrepared => PaymentState::Prepared,
            Transition::ConfirmPayment => PaymentState::Authorized,
            Transition::MarkAsPaid => PaymentState::Paid,
            Transition::Fail => PaymentState::Failed,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference payment states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    /// Created locally, not yet registered with the gateway.
    New,

    /// Registered with the gateway, buyer redirected to the paywall.
    Prepared,

    /// Gateway confirmed the payment, settlement pending.
    Authorized,

    /// Fully paid.
    Paid,

    /// Terminal failure.
    Failed,
}

impl PaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::New => "new",
            PaymentState::Prepared => "prepared",
            PaymentState::Authorized => "authorized",
            PaymentState::Paid => "paid",
            PaymentState::Failed => "failed",
        }
    }
}

impl StateMachine for PaymentState {
    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentState::*;
        match self {
            New => vec![Prepared, Failed],
            Prepared => vec![Authorized, Failed],
            Authorized => vec![Paid, Failed],
            Paid | Failed => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_names_match_orchestrator_vocabulary() {
        assert_eq!(Transition::ConfirmPrepared.as_str(), "confirm_prepared");
        assert_eq!(Transition::ConfirmPayment.as_str(), "confirm_payment");
        assert_eq!(Transition::MarkAsPaid.as_str(), "mark_as_paid");
        assert_eq!(Transition::Fail.to_string(), "fail");
    }

    #[test]
    fn transition_serializes_as_snake_case_name() {
        let json = serde_json::to_string(&Transition::ConfirmPayment).unwrap();
        assert_eq!(json, "\"confirm_payment\"");
    }

    #[test]
    fn confirm_payment_is_illegal_from_new() {
        assert!(!PaymentState::New.can_transition_to(&Transition::ConfirmPayment.target()));
    }

    #[test]
    fn happy_path_reaches_paid() {
        let state = PaymentState::New
            .transition_to(Transition::ConfirmPrepared.target())
            .and_then(|s| s.transition_to(Transition::ConfirmPayment.target()))
            .and_then(|s| s.transition_to(Transition::MarkAsPaid.target()));
        assert_eq!(state, Ok(PaymentState::Paid));
    }

    #[test]
    fn paid_and_failed_are_terminal() {
        assert!(PaymentState::Paid.is_terminal());
        assert!(PaymentState::Failed.is_terminal());
    }

    #[test]
    fn every_non_terminal_state_can_fail() {
        for state in [PaymentState::New, PaymentState::Prepared, PaymentState::Authorized] {
            assert!(state.can_transition_to(&PaymentState::Failed));
        }
    }
}
