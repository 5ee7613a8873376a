//! # Recovery Context
//!
//! Attempt and retry accounting for one collection call, the backup record
//! substituted when every endpoint fails, and the re-entrancy guard that
//! replaces the original's non-local jump recovery mechanism with an
//! explicit flag and an error return.

use std::time::Duration;

use thiserror::Error;

use super::config::ConfigError;
use super::model::SystemInfo;

/// Hard failures of a collection call: conditions outside the retry
/// model. Exhausting every endpoint is NOT represented here; that path
/// returns the backup with `Outcome::RecoverySuccess`.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The configuration was rejected before any attempt was made.
    #[error("Invalid collector configuration: {0}")]
    Config(#[from] ConfigError),

    /// A nested collection attempt was detected on a context whose
    /// previous attempt is still outstanding. Fatal misuse.
    #[error("Collection attempt already in progress on this recovery context")]
    Reentrancy,

    /// Cooperative cancellation was observed mid-collection.
    #[error("Collection cancelled")]
    Cancelled,
}

/// # Recovery Context
///
/// Owned exclusively by one collection call. Tracks per-endpoint retry
/// accounting, holds the backup [`SystemInfo`], and guards against
/// re-entrant attempts.
#[derive(Debug, Clone)]
pub struct RecoveryContext {
    /// Failed attempts against the current endpoint.
    retry_count: u32,
    /// Retry budget per endpoint.
    max_retries: u32,
    /// Known-good record substituted when every endpoint fails.
    backup: SystemInfo,
    /// True only while a transport call for the current attempt is outstanding.
    in_progress: bool,
}

impl RecoveryContext {
    /// Per-endpoint retry budget used by [`RecoveryContext::with_default_retries`].
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Creates a context seeded with the backup record and an explicit
    /// retry budget.
    pub fn new(backup: SystemInfo, max_retries: u32) -> Self {
        Self {
            retry_count: 0,
            max_retries,
            backup,
            in_progress: false,
        }
    }

    /// Creates a context with the default retry budget of 3.
    pub fn with_default_retries(backup: SystemInfo) -> Self {
        Self::new(backup, Self::DEFAULT_MAX_RETRIES)
    }

    /// Marks an attempt as outstanding.
    ///
    /// Fails fast with [`CollectError::Reentrancy`] when an attempt is
    /// already outstanding; proceeding would let two attempts share the
    /// accounting and the result record.
    pub fn begin_attempt(&mut self) -> Result<(), CollectError> {
        if self.in_progress {
            return Err(CollectError::Reentrancy);
        }
        self.in_progress = true;
        Ok(())
    }

    /// Clears the outstanding-attempt flag. Called on every exit path of an
    /// attempt, success or failure.
    pub fn end_attempt(&mut self) {
        self.in_progress = false;
    }

    /// Zeroes the retry counter when moving to the next endpoint.
    pub fn reset_for_endpoint(&mut self) {
        self.retry_count = 0;
    }

    /// True when the retry budget for the current endpoint is spent.
    pub fn exhausted(&self) -> bool {
        self.retry_count >= self.max_retries
    }

    /// Records one failed attempt against the current endpoint.
    pub fn record_failure(&mut self) {
        self.retry_count += 1;
    }

    /// Failed attempts against the current endpoint so far.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// The per-endpoint retry budget.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// The backup record this context was seeded with.
    pub fn backup(&self) -> &SystemInfo {
        &self.backup
    }
}

/// Backoff delay before retry `k` (1-indexed): `2^k` backoff units.
///
/// The unit defaults to one second in the configuration; tests shrink it to
/// a millisecond. The exponent saturates instead of overflowing, so the
/// delay is monotonically non-decreasing for any `k`.
pub fn backoff_delay(retry_count: u32, unit_ms: u64) -> Duration {
    Duration::from_millis(unit_ms.saturating_mul(2u64.saturating_pow(retry_count)))
}
