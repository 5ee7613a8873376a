//! # Wire Payload Decoding
//!
//! Decodes a response body into a field-addressable JSON value and applies
//! the expected fields onto a [`SystemInfo`] record. Fields are applied
//! individually: a missing or mistyped field leaves the record's current
//! (backup-seeded) value in place and marks the collection degraded, while
//! an unparseable body is an error the collector treats like a transport
//! failure.
//!
//! Wire schema: `{"apimodel": <integer>, "system": <integer>,
//! "osname": <string>}`; all fields optional.

use serde_json::Value;
use thiserror::Error;

use super::model::SystemInfo;

/// The response body was not valid JSON.
#[derive(Debug, Error)]
pub enum ParseError {
    /// `serde_json` rejected the body.
    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parses the raw body bytes into a generic JSON value.
pub fn decode(body: &[u8]) -> Result<Value, ParseError> {
    Ok(serde_json::from_slice(body)?)
}

/// Typed lookup of an integer field that fits the record's `i32` range.
///
/// Returns `None` for absent, mistyped, or out-of-range values. All three
/// count as "field not usable", distinct from a present zero.
fn field_i32(json: &Value, name: &str) -> Option<i32> {
    json.get(name)
        .and_then(Value::as_i64)
        .and_then(|v| i32::try_from(v).ok())
}

/// Typed lookup of a string field. Absent and mistyped are both `None`,
/// distinct from a present empty string.
fn field_str<'a>(json: &'a Value, name: &str) -> Option<&'a str> {
    json.get(name).and_then(Value::as_str)
}

/// Applies the expected fields from `json` onto `result`.
///
/// Returns `true` when the collection is degraded, i.e. at least one
/// expected field could not be applied. The `osname` value passes through
/// the record's byte bound.
pub fn apply_fields(result: &mut SystemInfo, json: &Value) -> bool {
    let mut degraded = false;

    match field_i32(json, "apimodel") {
        Some(value) => result.api_model = value,
        None => degraded = true,
    }

    match field_i32(json, "system") {
        Some(value) => result.system_id = value,
        None => degraded = true,
    }

    match field_str(json, "osname") {
        Some(value) => result.set_os_name(value),
        None => degraded = true,
    }

    degraded
}
