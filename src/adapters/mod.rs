//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `paynow` - Paynow V3 gateway (client and processor)
//! - `http` - reqwest-backed transport
//! - `memory` - In-memory payment record and scripted transport

pub mod http;
pub mod memory;
pub mod paynow;

pub use http::{ReqwestConnector, ReqwestTransport};
pub use memory::{InMemoryPayment, MockConnector, MockTransport};
pub use paynow::{Credentials, NewPayment, PaynowClient, PaynowProcessor};
