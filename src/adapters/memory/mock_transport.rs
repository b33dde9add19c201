//! Scripted HTTP transport for tests.
//!
//! Supports:
//! - Queued responses and transport errors, served in order
//! - Request capture for assertions
//! - A connector that counts connects and releases

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use http::StatusCode;

use crate::ports::{
    HttpTransport, TransportConnector, TransportError, TransportRequest, TransportResponse,
};

/// Transport that replays queued outcomes.
///
/// Clones share the same queue and request log.
///
/// # Example
///
/// ```ignore
/// let transport = MockTransport::new();
/// transport.push_json(StatusCode::CREATED, r#"{"paymentId":"P1"}"#);
///
/// let response = transport.send(request).await?;
/// assert_eq!(transport.requests().len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    outcomes: VecDeque<Result<TransportResponse, TransportError>>,
    requests: Vec<TransportRequest>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and body.
    pub fn push_json(&self, status: StatusCode, body: impl Into<String>) {
        self.state()
            .outcomes
            .push_back(Ok(TransportResponse::new(status, body)));
    }

    /// Queue a transport failure.
    pub fn push_error(&self, error: TransportError) {
        self.state().outcomes.push_back(Err(error));
    }

    /// Every request sent so far, oldest first.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.state().requests.clone()
    }

    pub fn last_request(&self) -> Option<TransportRequest> {
        self.state().requests.last().cloned()
    }

    /// Outcomes not yet consumed.
    pub fn pending(&self) -> usize {
        self.state().outcomes.len()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut state = self.state();
        state.requests.push(request);
        state.outcomes.pop_front().unwrap_or_else(|| {
            Err(TransportError::Other(
                "no scripted response left".to_string(),
            ))
        })
    }
}

/// Connector handing out handles onto one `MockTransport`.
#[derive(Clone, Default)]
pub struct MockConnector {
    transport: MockTransport,
    connects: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
    refuse: bool,
}

impl MockConnector {
    pub fn new(transport: MockTransport) -> Self {
        Self {
            transport,
            ..Default::default()
        }
    }

    /// Connector whose every `connect` fails.
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Default::default()
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Handles dropped so far.
    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportConnector for MockConnector {
    async fn connect(&self) -> Result<Box<dyn HttpTransport>, TransportError> {
        if self.refuse {
            return Err(TransportError::Connect("connection refused".to_string()));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TrackedHandle {
            transport: self.transport.clone(),
            releases: self.releases.clone(),
        }))
    }
}

/// Handle that reports its release when dropped.
struct TrackedHandle {
    transport: MockTransport,
    releases: Arc<AtomicUsize>,
}

#[async_trait]
impl HttpTransport for TrackedHandle {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.transport.send(request).await
    }
}

impl Drop for TrackedHandle {
    fn drop(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}
