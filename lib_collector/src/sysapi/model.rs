//! # System Info Data Model
//!
//! The record produced by a collection, the authentication modes a request
//! can carry, and the outcome reported back to the caller. One canonical
//! model is shared by the collector, the configuration surface, and the
//! tests.

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Deserializer, Serialize};

/// Upper bound, in bytes, for the `os_name` field of a [`SystemInfo`].
pub const OS_NAME_MAX_BYTES: usize = 99;

/// Sentinel for numeric fields that have not been populated by any
/// response. Distinct from every legitimate value the wire can carry.
pub const UNPOPULATED: i32 = -1;

/// # System Info
///
/// The structured record collected from an endpoint (or substituted from
/// the backup). Wire names are `apimodel`, `system`, and `osname`.
///
/// Invariants: `os_name` is NUL-free and at most [`OS_NAME_MAX_BYTES`]
/// bytes; numeric fields default to [`UNPOPULATED`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// API model identifier reported by the endpoint.
    #[serde(rename = "apimodel")]
    pub api_model: i32,
    /// System identifier reported by the endpoint.
    #[serde(rename = "system")]
    pub system_id: i32,
    /// Operating system name, bounded and NUL-free.
    #[serde(rename = "osname", deserialize_with = "deserialize_os_name")]
    pub os_name: String,
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self {
            api_model: UNPOPULATED,
            system_id: UNPOPULATED,
            os_name: String::new(),
        }
    }
}

impl SystemInfo {
    /// Creates a record, sanitizing `os_name` through the field bound.
    pub fn new(api_model: i32, system_id: i32, os_name: &str) -> Self {
        Self {
            api_model,
            system_id,
            os_name: sanitize_os_name(os_name),
        }
    }

    /// Overwrites `os_name`, stripping NUL bytes and truncating to
    /// [`OS_NAME_MAX_BYTES`] on a character boundary.
    pub fn set_os_name(&mut self, raw: &str) {
        self.os_name = sanitize_os_name(raw);
    }

    /// True when the record still carries either numeric sentinel.
    pub fn is_partially_unpopulated(&self) -> bool {
        self.api_model == UNPOPULATED || self.system_id == UNPOPULATED
    }
}

impl fmt::Display for SystemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SystemInfo
    Api model: {},
    System id: {},
    Os name: {}
",
            self.api_model, self.system_id, self.os_name,
        )
    }
}

/// Strips NUL bytes and truncates to the byte bound without splitting a
/// character.
fn sanitize_os_name(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| *c != '\0').collect();
    if cleaned.len() <= OS_NAME_MAX_BYTES {
        return cleaned;
    }
    let mut end = OS_NAME_MAX_BYTES;
    while !cleaned.is_char_boundary(end) {
        end -= 1;
    }
    cleaned[..end].to_string()
}

/// Custom deserializer so records loaded from config files or the wire
/// keep the `os_name` invariant.
fn deserialize_os_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(sanitize_os_name(&raw))
}

/// # Auth Mode
///
/// How a collection request authenticates. Exactly one variant is active;
/// the enum representation replaces the original's pair of mutually
/// exclusive flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AuthMode {
    /// No authentication headers are sent.
    #[default]
    None,
    /// HTTP Basic credentials.
    Basic {
        /// Account name for the credential pair.
        username: String,
        /// Password for the credential pair; may be empty.
        password: String,
    },
    /// Bearer token authentication.
    Bearer {
        /// The opaque token placed in the Authorization header.
        token: String,
    },
}

impl AuthMode {
    /// Convenience constructor for Basic credentials.
    pub fn basic(username: &str, password: &str) -> Self {
        Self::Basic {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Convenience constructor for a Bearer token.
    pub fn bearer(token: &str) -> Self {
        Self::Bearer {
            token: token.to_string(),
        }
    }

    /// Builds the request headers for this mode.
    ///
    /// `Basic` produces `Authorization: Basic <base64(user:pass)>`;
    /// `Bearer` produces `Authorization: Bearer <token>` plus
    /// `Accept: application/json`. Values that cannot form a valid header
    /// are skipped, which leaves the request unauthenticated and lets the
    /// server answer 401.
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let entries: Vec<(HeaderName, String)> = match self {
            AuthMode::None => Vec::new(),
            AuthMode::Basic { username, password } => {
                let credentials = BASE64_STANDARD.encode(format!("{}:{}", username, password));
                vec![(AUTHORIZATION, format!("Basic {}", credentials))]
            }
            AuthMode::Bearer { token } => vec![
                (AUTHORIZATION, format!("Bearer {}", token)),
                (ACCEPT, "application/json".to_string()),
            ],
        };

        for (name, value) in entries {
            if let Ok(h_value) = HeaderValue::from_str(&value) {
                headers.insert(name, h_value);
            }
        }

        headers
    }
}

/// # Outcome
///
/// Terminal result of one collection. Hard failures (configuration misuse,
/// re-entrancy, cancellation) travel on the error arm of the collect call
/// instead; exhausting every endpoint is deliberately NOT a hard failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A live endpoint answered 200 with a parseable body. `degraded` is
    /// true when at least one expected field was missing or mistyped.
    Success {
        /// Whether the response was missing or mistyping expected fields.
        degraded: bool,
    },
    /// Every endpoint was exhausted; the backup record was substituted.
    RecoverySuccess,
    /// An endpoint answered 401; collection stopped immediately.
    AuthFailed,
}

impl Outcome {
    /// True for any outcome that produced usable data (live or backup).
    pub fn has_data(&self) -> bool {
        !matches!(self, Outcome::AuthFailed)
    }

    /// True when live data was collected, degraded or not.
    pub fn is_live(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success { degraded: false } => write!(f, "FULL SUCCESS"),
            Outcome::Success { degraded: true } => write!(f, "DEGRADED SUCCESS (partial fields)"),
            Outcome::RecoverySuccess => write!(f, "RECOVERY SUCCESS (using backup data)"),
            Outcome::AuthFailed => write!(f, "AUTHENTICATION FAILED"),
        }
    }
}
