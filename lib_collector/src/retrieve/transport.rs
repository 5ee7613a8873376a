//! # HTTP Transport Boundary
//!
//! This module provides the transport seam used by the collection core.
//! A transport performs exactly one HTTP GET per call and reports the raw
//! status code and body bytes; it never retries internally. Retry and
//! backoff policy belong to the collector, so stacking another retry layer
//! here would multiply attempts behind the collector's back.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use thiserror::Error;

/// Errors produced by a transport while executing a single GET.
///
/// Every variant is treated as transient by the collector: connect
/// failures, DNS errors, TLS errors, timeouts, and body-read failures all
/// land here and feed the retry accounting.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying HTTP client failed (connect, DNS, TLS, timeout, or body read).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The transport could not serve the call at all.
    #[error("Transport unavailable: {0}")]
    Unavailable(String),
}

/// The raw result of one HTTP GET: status code plus body bytes.
///
/// Interpretation of the status code (success, auth failure, retry) is the
/// collector's job; the transport reports what the wire said.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// The numeric HTTP status code.
    pub status: u16,
    /// The response body bytes, possibly empty.
    pub body: Vec<u8>,
}

/// Abstraction over the HTTP layer so the collector can run against the
/// real network or a scripted mock in tests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Performs one blocking-style GET with the given headers.
    ///
    /// # Arguments
    /// * `url` - The absolute endpoint URL.
    /// * `headers` - Headers to inject, including any authentication.
    /// * `timeout` - Total per-call deadline.
    /// * `connect_timeout` - Deadline for establishing the connection.
    async fn get(
        &self,
        url: &str,
        headers: HeaderMap,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<TransportResponse, TransportError>;
}

/// Production transport built on `reqwest`.
///
/// A fresh client is built for every call so that no connection, pool slot,
/// or buffer outlives its attempt, and so the connect timeout can vary per
/// call. Redirects are followed up to a small fixed limit.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReqwestTransport;

impl ReqwestTransport {
    /// Creates a new `ReqwestTransport`.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        headers: HeaderMap,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .redirect(Policy::limited(10))
            .build()?;

        let response = client
            .get(url)
            .headers(headers)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(TransportResponse { status, body })
    }
}
