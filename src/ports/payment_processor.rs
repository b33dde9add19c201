//! Payment processor port.
//!
//! Contract between a payment orchestrator and a gateway integration. The
//! orchestrator hands over its payment record; the processor talks to the
//! gateway and requests lifecycle transitions on that record.
//!
//! # Design
//!
//! - **Gateway agnostic**: nothing here is Paynow specific
//! - **Record owned by caller**: processors borrow the payment per call
//! - **Idempotent callbacks**: repeated notifications must not fail

use std::collections::BTreeMap;

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use rust_decimal::Decimal;

use super::http_transport::{TransportError, TransportResponse};
use super::payment::{FsmError, Payment};
use crate::domain::payment::Transition;
use crate::domain::paynow::{Currency, PaymentStatus, SignatureError};

/// Port for gateway integrations.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Stable machine name.
    fn slug(&self) -> &'static str;

    /// Human readable name.
    fn display_name(&self) -> &'static str;

    fn accepted_currencies(&self) -> &'static [Currency];

    /// Registers the payment with the gateway and returns where to send the
    /// buyer.
    async fn prepare_transaction(
        &self,
        payment: &mut dyn Payment,
    ) -> Result<TransactionResult, PaymentError>;

    /// Authenticates an incoming notification before it is handled.
    async fn verify_callback(
        &self,
        payment: &dyn Payment,
        headers: &HeaderMap,
        raw_body: Option<&[u8]>,
    ) -> Result<(), PaymentError>;

    /// Applies a verified notification to the payment's lifecycle.
    async fn handle_callback(
        &self,
        payment: &mut dyn Payment,
        raw_body: &[u8],
    ) -> Result<(), PaymentError>;

    /// Polls the gateway and suggests the next transition. Never mutates.
    async fn fetch_payment_status(
        &self,
        payment: &dyn Payment,
    ) -> Result<PaymentStatusUpdate, PaymentError>;

    /// Captures a pre-authorized amount.
    async fn charge(
        &self,
        payment: &mut dyn Payment,
        amount: Option<Decimal>,
    ) -> Result<ChargeResponse, PaymentError>;

    /// Releases a pre-authorization and returns the released amount.
    async fn release_lock(&self, payment: &mut dyn Payment) -> Result<Decimal, PaymentError>;

    /// Starts a refund and returns the amount requested.
    async fn start_refund(
        &self,
        payment: &mut dyn Payment,
        amount: Option<Decimal>,
    ) -> Result<Decimal, PaymentError>;

    /// Cancels the last started refund.
    async fn cancel_refund(&self, payment: &mut dyn Payment) -> Result<bool, PaymentError>;
}

/// Where and how to send the buyer after preparing a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionResult {
    pub redirect_url: String,
    pub method: Method,
    pub form_data: Option<BTreeMap<String, String>>,
    pub headers: BTreeMap<String, String>,
}

/// Outcome of a capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeResponse {
    pub amount_charged: Decimal,
    pub success: bool,
}

/// Result of polling the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentStatusUpdate {
    /// Transition the caller should consider applying.
    pub transition: Option<Transition>,

    /// Status as reported, when recognised.
    pub remote_status: Option<PaymentStatus>,
}

/// Errors from processor operations.
#[derive(Debug, Clone)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message. Never contains credentials.
    pub message: String,

    /// Gateway's error type or local detail code (if available).
    pub provider_code: Option<String>,

    /// Raw gateway response behind the failure (if any).
    pub response: Option<TransportResponse>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            response: None,
            retryable: code.is_retryable(),
        }
    }

    /// Attach a provider code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Attach the gateway response.
    pub fn with_response(mut self, response: TransportResponse) -> Self {
        self.response = Some(response);
        self
    }

    pub fn credentials(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::CredentialsError, message)
    }

    pub fn communication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::CommunicationError, message)
    }

    pub fn refund_failure(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::RefundFailure, message)
    }

    pub fn invalid_callback(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidCallback, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::UnsupportedOperation, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidRequest, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidResponse, message)
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidConfiguration, message)
    }

    /// Check if the operation may be retried.
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// HTTP status a notification endpoint should answer with.
    pub fn status_code(&self) -> StatusCode {
        match self.code {
            PaymentErrorCode::InvalidCallback => match self.provider_code.as_deref() {
                Some(SIGNATURE_REJECTED) => StatusCode::UNAUTHORIZED,
                _ => StatusCode::BAD_REQUEST,
            },
            PaymentErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            PaymentErrorCode::UnsupportedOperation => StatusCode::NOT_IMPLEMENTED,
            PaymentErrorCode::CredentialsError
            | PaymentErrorCode::CommunicationError
            | PaymentErrorCode::RefundFailure
            | PaymentErrorCode::TransportError
            | PaymentErrorCode::InvalidResponse => StatusCode::BAD_GATEWAY,
            PaymentErrorCode::InvalidConfiguration | PaymentErrorCode::TransitionFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Provider code for notifications whose signature failed to verify.
pub const SIGNATURE_REJECTED: &str = "signature_rejected";

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<SignatureError> for PaymentError {
    fn from(err: SignatureError) -> Self {
        let rejected = matches!(
            err,
            SignatureError::MissingSignature | SignatureError::Mismatch { .. }
        );
        let error = PaymentError::invalid_callback(err.to_string());
        if rejected {
            error.with_provider_code(SIGNATURE_REJECTED)
        } else {
            error
        }
    }
}

impl From<TransportError> for PaymentError {
    fn from(err: TransportError) -> Self {
        PaymentError::new(PaymentErrorCode::TransportError, err.to_string())
    }
}

impl From<FsmError> for PaymentError {
    fn from(err: FsmError) -> Self {
        PaymentError::new(PaymentErrorCode::TransitionFailed, err.to_string())
    }
}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentErrorCode {
    /// Gateway rejected the API key (HTTP 401).
    CredentialsError,

    /// Gateway answered with an unexpected status.
    CommunicationError,

    /// Gateway refused to create a refund.
    RefundFailure,

    /// Notification failed verification or could not be parsed.
    InvalidCallback,

    /// Operation not offered by this gateway.
    UnsupportedOperation,

    /// Request never got an answer.
    TransportError,

    /// Caller-supplied data cannot form a valid request.
    InvalidRequest,

    /// Success status with an unreadable body.
    InvalidResponse,

    /// Missing or malformed processor settings.
    InvalidConfiguration,

    /// The payment state machine failed hard.
    TransitionFailed,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::CommunicationError | PaymentErrorCode::TransportError
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::CredentialsError => "credentials_error",
            PaymentErrorCode::CommunicationError => "communication_error",
            PaymentErrorCode::RefundFailure => "refund_failure",
            PaymentErrorCode::InvalidCallback => "invalid_callback",
            PaymentErrorCode::UnsupportedOperation => "unsupported_operation",
            PaymentErrorCode::TransportError => "transport_error",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::InvalidResponse => "invalid_response",
            PaymentErrorCode::InvalidConfiguration => "invalid_configuration",
            PaymentErrorCode::TransitionFailed => "transition_failed",
        };
        write!(f, "{}", s)
    }
}
