//! Mapping from Paynow payment statuses to lifecycle transitions.
//!
//! Two paths exist. Notifications (push) can confirm and settle in one go;
//! polling (pull) only suggests the single next transition and leaves the
//! decision to the caller.

use super::types::PaymentStatus;
use crate::domain::payment::Transition;

/// What a notification asks the payment lifecycle to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushAction {
    /// Apply `ConfirmPayment` if allowed, then `MarkAsPaid`.
    ConfirmAndMarkPaid,

    /// Apply `Fail` if the payment supports it.
    Fail,

    /// Nothing to do.
    None,
}

/// Action for a notification carrying `status`.
pub fn push_action(status: Option<PaymentStatus>) -> PushAction {
    match status {
        Some(PaymentStatus::Confirmed) => PushAction::ConfirmAndMarkPaid,
        Some(
            PaymentStatus::Rejected
            | PaymentStatus::Error
            | PaymentStatus::Expired
            | PaymentStatus::Abandoned,
        ) => PushAction::Fail,
        Some(PaymentStatus::New | PaymentStatus::Pending) | None => PushAction::None,
    }
}

/// Transition suggested by a polled status.
pub fn pull_transition(status: PaymentStatus) -> Option<Transition> {
    match status {
        PaymentStatus::New => None,
        PaymentStatus::Pending => Some(Transition::ConfirmPrepared),
        PaymentStatus::Confirmed => Some(Transition::ConfirmPayment),
        PaymentStatus::Rejected
        | PaymentStatus::Error
        | PaymentStatus::Expired
        | PaymentStatus::Abandoned => Some(Transition::Fail),
    }
}
