//! In-memory payment record driven by the reference lifecycle.
//!
//! Stands in for an orchestrator's payment record in tests.
//! Supports:
//! - Starting from any lifecycle state
//! - Hiding transitions to simulate state machines that lack them
//! - Hard-failure injection for a chosen transition
//! - A log of applied transitions

use rust_decimal::Decimal;

use crate::domain::foundation::StateMachine;
use crate::domain::payment::{PaymentState, Transition};
use crate::ports::{BuyerInfo, FsmError, Payment, TransitionOutcome};

/// Payment record backed by [`PaymentState`].
#[derive(Debug, Clone)]
pub struct InMemoryPayment {
    id: String,
    amount_required: Decimal,
    amount_paid: Decimal,
    currency: String,
    description: String,
    buyer: BuyerInfo,
    state: PaymentState,
    external_id: Option<String>,
    external_refund_id: Option<String>,
    unsupported: Vec<Transition>,
    failing: Option<Transition>,
    applied: Vec<Transition>,
}

impl InMemoryPayment {
    /// New payment in state `New`.
    pub fn new(
        id: impl Into<String>,
        amount_required: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            amount_required,
            amount_paid: Decimal::ZERO,
            currency: currency.into(),
            description: String::new(),
            buyer: BuyerInfo::default(),
            state: PaymentState::New,
            external_id: None,
            external_refund_id: None,
            unsupported: Vec::new(),
            failing: None,
            applied: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_buyer(mut self, buyer: BuyerInfo) -> Self {
        self.buyer = buyer;
        self
    }

    pub fn with_state(mut self, state: PaymentState) -> Self {
        self.state = state;
        self
    }

    pub fn with_amount_paid(mut self, amount: Decimal) -> Self {
        self.amount_paid = amount;
        self
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn with_external_refund_id(mut self, refund_id: impl Into<String>) -> Self {
        self.external_refund_id = Some(refund_id.into());
        self
    }

    /// Pretend the state machine does not define `transition`.
    pub fn without_transition(mut self, transition: Transition) -> Self {
        self.unsupported.push(transition);
        self
    }

    /// Make `transition` fail hard whenever it is fired.
    pub fn failing_on(mut self, transition: Transition) -> Self {
        self.failing = Some(transition);
        self
    }

    pub fn state(&self) -> PaymentState {
        self.state
    }

    /// Transitions applied so far, oldest first.
    pub fn applied(&self) -> &[Transition] {
        &self.applied
    }
}

impl Payment for InMemoryPayment {
    fn id(&self) -> &str {
        &self.id
    }

    fn amount_required(&self) -> Decimal {
        self.amount_required
    }

    fn amount_paid(&self) -> Decimal {
        self.amount_paid
    }

    fn currency(&self) -> &str {
        &self.currency
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn buyer(&self) -> BuyerInfo {
        self.buyer.clone()
    }

    fn supports(&self, transition: Transition) -> bool {
        !self.unsupported.contains(&transition)
    }

    fn can_transition(&self, transition: Transition) -> bool {
        self.supports(transition) && self.state.can_transition_to(&transition.target())
    }

    fn transition(&mut self, transition: Transition) -> Result<TransitionOutcome, FsmError> {
        if self.failing == Some(transition) {
            return Err(FsmError::new(transition, "injected failure"));
        }
        if !self.can_transition(transition) {
            return Ok(TransitionOutcome::Illegal);
        }

        self.state = transition.target();
        if self.state == PaymentState::Paid {
            self.amount_paid = self.amount_required;
        }
        self.applied.push(transition);
        Ok(TransitionOutcome::Applied)
    }

    fn current_state(&self) -> &str {
        self.state.as_str()
    }

    fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    fn set_external_id(&mut self, external_id: String) {
        self.external_id = Some(external_id);
    }

    fn external_refund_id(&self) -> Option<&str> {
        self.external_refund_id.as_deref()
    }

    fn set_external_refund_id(&mut self, refund_id: String) {
        self.external_refund_id = Some(refund_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment() -> InMemoryPayment {
        InMemoryPayment::new("pay-1", Decimal::new(4999, 2), "PLN")
    }

    #[test]
    fn legal_transition_is_applied_and_logged() {
        let mut payment = payment();

        let outcome = payment.transition(Transition::ConfirmPrepared);

        assert_eq!(outcome, Ok(TransitionOutcome::Applied));
        assert_eq!(payment.state(), PaymentState::Prepared);
        assert_eq!(payment.applied(), &[Transition::ConfirmPrepared]);
    }

    #[test]
    fn illegal_transition_changes_nothing() {
        let mut payment = payment();

        let outcome = payment.transition(Transition::MarkAsPaid);

        assert_eq!(outcome, Ok(TransitionOutcome::Illegal));
        assert_eq!(payment.state(), PaymentState::New);
        assert!(payment.applied().is_empty());
    }

    #[test]
    fn marking_paid_records_amount_paid() {
        let mut payment = payment().with_state(PaymentState::Authorized);

        payment.transition(Transition::MarkAsPaid).unwrap();

        assert_eq!(payment.amount_paid(), payment.amount_required());
        assert_eq!(payment.current_state(), "paid");
    }

    #[test]
    fn hidden_transition_is_unsupported() {
        let payment = payment().without_transition(Transition::Fail);

        assert!(!payment.supports(Transition::Fail));
        assert!(!payment.can_transition(Transition::Fail));
        assert!(payment.supports(Transition::ConfirmPrepared));
    }

    #[test]
    fn injected_failure_is_hard_error() {
        let mut payment = payment().failing_on(Transition::ConfirmPrepared);

        let err = payment.transition(Transition::ConfirmPrepared).unwrap_err();

        assert_eq!(err.transition, Transition::ConfirmPrepared);
        assert_eq!(payment.state(), PaymentState::New);
    }
}
