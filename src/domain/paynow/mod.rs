//! Paynow V3 gateway domain: vocabularies, money, signatures, notifications
//! and status mapping. No I/O.

mod money;
mod notification;
mod signature;
mod transitions;
mod types;

pub use money::{from_minor_units, to_minor_units};
pub use notification::NotificationPayload;
pub use signature::{canonical_request_payload, PaynowSigner, SignatureError};
pub use transitions::{pull_transition, push_action, PushAction};
pub use types::{
    AuthorizationType, Currency, ErrorType, PaymentMethodStatus, PaymentMethodType,
    PaymentStatus, RefundReason, RefundStatus,
};
