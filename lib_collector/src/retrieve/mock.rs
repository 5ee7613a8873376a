//! # Scripted Mock Transport
//!
//! A deterministic `HttpTransport` implementation for tests and offline
//! runs. Each call pops the next pre-programmed outcome and records the
//! exact URL, headers, and timeouts it was invoked with, so tests can
//! assert attempt counts, failover order, and timeout escalation.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use super::transport::{HttpTransport, TransportError, TransportResponse};

/// One recorded transport invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// The endpoint URL that was requested.
    pub url: String,
    /// The headers that were injected.
    pub headers: HeaderMap,
    /// The total per-call timeout the collector asked for.
    pub timeout: Duration,
    /// The connect timeout the collector asked for.
    pub connect_timeout: Duration,
}

/// A scripted outcome for one call.
pub enum MockOutcome {
    /// Respond with the given status and body bytes.
    Respond(u16, Vec<u8>),
    /// Fail with a transport-level error.
    Fail(String),
}

/// Scripted transport: pops one `MockOutcome` per call, in order.
///
/// When the script runs dry every further call fails with a transport
/// error, which matches an endpoint that stays unreachable.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<MockOutcome>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    /// Creates a mock with an empty script; every call will fail.
    pub fn unreachable() -> Self {
        Self::default()
    }

    /// Creates a mock from a list of scripted outcomes.
    pub fn scripted(outcomes: Vec<MockOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Number of calls the collector made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("mock call log poisoned").len()
    }

    /// Snapshot of every recorded call.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("mock call log poisoned").clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(
        &self,
        url: &str,
        headers: HeaderMap,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.lock().expect("mock call log poisoned").push(RecordedCall {
            url: url.to_string(),
            headers,
            timeout,
            connect_timeout,
        });

        let next = self.script.lock().expect("mock script poisoned").pop_front();
        match next {
            Some(MockOutcome::Respond(status, body)) => Ok(TransportResponse { status, body }),
            Some(MockOutcome::Fail(reason)) => Err(TransportError::Unavailable(reason)),
            None => Err(TransportError::Unavailable(format!(
                "no route to {}",
                url
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_outcomes_pop_in_order() {
        let mock = MockTransport::scripted(vec![
            MockOutcome::Fail("connection refused".into()),
            MockOutcome::Respond(200, b"{}".to_vec()),
        ]);

        let first = mock
            .get("http://one", HeaderMap::new(), Duration::from_secs(1), Duration::from_secs(1))
            .await;
        assert!(first.is_err());

        let second = mock
            .get("http://one", HeaderMap::new(), Duration::from_secs(1), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(second.status, 200);

        // A drained script behaves like a dead endpoint.
        let third = mock
            .get("http://one", HeaderMap::new(), Duration::from_secs(1), Duration::from_secs(1))
            .await;
        assert!(third.is_err());
        assert_eq!(mock.call_count(), 3);
    }
}
