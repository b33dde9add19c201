//! Domain layer: gateway rules with no I/O.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (validation errors, state machine trait)
//! - `payment` - Lifecycle transitions the adapter requests and reference states
//! - `paynow` - Paynow vocabularies, money conversion, signatures, status mapping

pub mod foundation;
pub mod payment;
pub mod paynow;
