//! HTTP client adapters.

mod reqwest_transport;

pub use reqwest_transport::{ReqwestConnector, ReqwestTransport};
