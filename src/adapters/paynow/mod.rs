//! Paynow V3 gateway adapter.
//!
//! Implements the `PaymentProcessor` port for Paynow, including:
//! - Signed calls to the six REST operations
//! - Notification signature verification
//! - Mapping of pushed and polled statuses to lifecycle transitions
//!
//! # Security
//!
//! - Request and notification signatures use HMAC-SHA256
//! - Notification signatures are compared in constant time
//! - Keys are handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! Settings read by `PaynowProcessor::from_settings`:
//! - `api_key`: Paynow API key
//! - `signature_key`: Paynow signature key
//! - `continue_url`: optional buyer return URL, may contain `{payment_id}`
//! - `sandbox`: `true` (default) for the sandbox environment

mod api_types;
mod client;
mod processor;

pub use api_types::{
    Buyer, CreatePaymentRequest, CreatePaymentResponse, CreateRefundRequest,
    CreateRefundResponse, ErrorDetail, ErrorResponse, OrderItem, PaymentMethod,
    PaymentMethodGroup, PaymentStatusResponse, RefundStatusResponse,
};
pub use client::{Credentials, NewPayment, PaynowClient};
pub use processor::{setting_keys, PaynowProcessor, DISPLAY_NAME, PRODUCTION_URL, SANDBOX_URL, SLUG};
