//! `reqwest` implementation of the HTTP transport port.
//!
//! reqwest 0.11 is built on `http` 0.2 while the ports use `http` 1.x, so
//! methods, headers and statuses cross the boundary as strings and numbers.

use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;

use crate::ports::{
    HttpTransport, TransportConnector, TransportError, TransportRequest, TransportResponse,
};

/// Transport over a `reqwest::Client` and its connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| TransportError::Other(e.to_string()))?;

        let mut builder = self.http_client.request(method, &request.url);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name.as_str(), value.as_bytes());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = StatusCode::from_u16(response.status().as_u16())
            .map_err(|e| TransportError::Other(e.to_string()))?;
        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(TransportResponse { status, body })
    }
}

/// Connector building a fresh `reqwest::Client` per connection.
///
/// Dropping the returned transport closes its pool.
#[derive(Debug, Clone, Default)]
pub struct ReqwestConnector {
    timeout: Option<Duration>,
}

impl ReqwestConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a total request timeout to every transport handed out.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl TransportConnector for ReqwestConnector {
    async fn connect(&self) -> Result<Box<dyn HttpTransport>, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        Ok(Box::new(ReqwestTransport::new(http_client)))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, Method};

    #[tokio::test]
    async fn connector_hands_out_transports() {
        let connector = ReqwestConnector::new().with_timeout(Duration::from_secs(5));
        assert!(connector.connect().await.is_ok());
    }

    #[tokio::test]
    async fn malformed_url_is_a_transport_error() {
        let transport = ReqwestTransport::new(reqwest::Client::new());
        let request = TransportRequest {
            method: Method::GET,
            url: "not a url".to_string(),
            headers: HeaderMap::new(),
            body: None,
            query: Vec::new(),
        };

        let result = transport.send(request).await;

        assert!(matches!(result, Err(TransportError::Other(_))));
    }
}
