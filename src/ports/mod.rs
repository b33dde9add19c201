//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Gateway Ports
//!
//! - `PaymentProcessor` - Orchestrator-facing gateway contract
//! - `HttpTransport` / `TransportConnector` - Outbound HTTP
//!
//! ## Collaborator Ports
//!
//! - `Payment` - Payment record and its lifecycle state machine
//! - `SettingsProvider` - Per-processor settings

mod http_transport;
mod payment;
mod payment_processor;
mod settings;

pub use http_transport::{
    HttpTransport, TransportConnector, TransportError, TransportRequest, TransportResponse,
};
pub use payment::{BuyerInfo, FsmError, Payment, TransitionOutcome};
pub use payment_processor::{
    ChargeResponse, PaymentError, PaymentErrorCode, PaymentProcessor, PaymentStatusUpdate,
    TransactionResult, SIGNATURE_REJECTED,
};
pub use settings::SettingsProvider;
