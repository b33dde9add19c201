//! Generic payment lifecycle vocabulary.
//!
//! The authoritative payment state machine belongs to the orchestrator. This
//! module names the transitions the Paynow adapter asks for and ships a small
//! reference lifecycle used by the in-memory payment record.

mod lifecycle;

pub use lifecycle::{PaymentState, Transition};
