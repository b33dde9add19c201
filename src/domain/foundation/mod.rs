//! Foundation module - Shared domain primitives.
//!
//! Contains the state machine contract and validation errors used by the
//! payment lifecycle and the Paynow vocabulary.

mod errors;
mod state_machine;

pub use errors::{require_non_empty, ValidationError};
pub use state_machine::StateMachine;
