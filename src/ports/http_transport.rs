//! HTTP transport port.
//!
//! The gateway client builds fully signed requests and hands them to an
//! `HttpTransport`. Transports only move bytes: any HTTP status is a
//! successful exchange, errors are reserved for connection-level failures.

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use thiserror::Error;

/// A request ready to be put on the wire.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,

    /// Absolute URL without query string.
    pub url: String,

    pub headers: HeaderMap,

    /// Exact body bytes that were signed, if any.
    pub body: Option<String>,

    /// Query parameters, appended by the transport.
    pub query: Vec<(String, String)>,
}

/// Raw response from the remote side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Connection-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Transport failure: {0}")]
    Other(String),
}

/// Sends HTTP requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Performs one exchange.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Hands out transports.
///
/// Each call yields a fresh handle. Dropping the handle releases whatever it
/// holds, so a client that connects per call never leaks connections.
#[async_trait]
pub trait TransportConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn HttpTransport>, TransportError>;
}
