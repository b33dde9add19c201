//! In-memory adapters for tests and local runs.

mod in_memory_payment;
mod mock_transport;

pub use in_memory_payment::InMemoryPayment;
pub use mock_transport::{MockConnector, MockTransport};
