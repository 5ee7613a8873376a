//! # System Info Collection Module
//!
//! This module groups the data model and the collection logic for the
//! internal system-info API. Its purpose is to produce a usable
//! [`model::SystemInfo`] record under adverse conditions: endpoints are
//! tried in failover order with bounded retries and exponential backoff,
//! authentication failures stop the run immediately, and exhausting every
//! endpoint substitutes a known-good backup instead of failing the caller.
//!
//! ## Contained Modules:
//!
//! - **`model`**: The `SystemInfo` record, `AuthMode`, and the `Outcome`
//!   reported to callers.
//! - **`payload`**: Wire payload decoding and per-field application with
//!   degraded-result tracking.
//! - **`recovery`**: Retry accounting, the backup record, the re-entrancy
//!   guard, and the backoff policy.
//! - **`config`**: The caller-facing configuration surface with file
//!   loading and validation.
//! - **`collector`**: The retry/failover/fallback loop tying the above
//!   together over an `HttpTransport`.

/// The system-info record, authentication modes, and collection outcomes.
pub mod model;
/// Wire payload decoding and field application.
pub mod payload;
/// Retry accounting, backup data, and the re-entrancy guard.
pub mod recovery;
/// The collector configuration surface.
pub mod config;
/// The resilient collection loop.
pub mod collector;
