//! # Data Retrieval Module
//!
//! This module provides a centralized location for the HTTP transport
//! boundary used by the collection core.
//!
//! ## Purpose:
//! The goal of the `retrieve` module is to isolate network communication
//! behind a narrow trait so that the collection algorithm can be exercised
//! against the real network or against a deterministic script. The
//! transport performs exactly one GET per call; resilience (retries,
//! backoff, failover, fallback) lives in the `sysapi` module.
//!
//! ## Contained Modules:
//!
//! - **`transport`**: The `HttpTransport` trait and the production
//!   `ReqwestTransport` built on `reqwest`, with per-call timeouts and
//!   redirect following.
//! - **`mock`**: A scripted `MockTransport` that records calls and replays
//!   pre-programmed outcomes, used by the unit tests and the offline
//!   integration runner.

/// The `HttpTransport` trait and the production `reqwest`-backed transport.
pub mod transport;
/// Scripted transport for tests and offline runs.
pub mod mock;
