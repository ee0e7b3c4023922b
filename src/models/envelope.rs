//! Success envelope handling
//!
//! The backend wraps most answers as `{status, data, message}`; list
//! endpoints add paging counters. Bare arrays and objects pass through.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Envelope status of a successful call
pub const STATUS_OK: &str = "OK";

/// Envelope status of a call the backend refused
pub const STATUS_ERR: &str = "ERR";

/// Whether a body is the backend's envelope rather than bare data
///
/// An envelope is an object with a `status` key that either carries `data`
/// or is the backend's `"OK"`/`"ERR"` marker. Entities with their own
/// `status` and `message` fields (order states, ratings) are not envelopes.
pub fn is_envelope(value: &Value) -> bool {
    match value.as_object() {
        Some(object) => {
            object.contains_key("status")
                && (object.contains_key("data") || envelope_status(value).is_some())
        }
        None => false,
    }
}

/// Whether a body is an envelope reporting a refused call
pub fn is_error_envelope(value: &Value) -> bool {
    envelope_status(value) == Some(STATUS_ERR)
}

fn envelope_status(value: &Value) -> Option<&'static str> {
    match value.get("status").and_then(Value::as_str) {
        Some(STATUS_OK) => Some(STATUS_OK),
        Some(STATUS_ERR) => Some(STATUS_ERR),
        _ => None,
    }
}

/// Extract the data payload of a success body
///
/// Envelopes without `data` yield `null`.
pub fn unwrap_envelope(value: Value) -> Value {
    if !is_envelope(&value) {
        return value;
    }
    match value {
        Value::Object(mut object) => object.remove("data").unwrap_or(Value::Null),
        other => other,
    }
}

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_current: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_page: Option<u64>,
}

/// `"data": null` reads as an empty list
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl<T> Page<T>
where
    T: for<'de> Deserialize<'de>,
{
    /// Read a page from a raw success body
    ///
    /// Envelopes keep their counters; a bare array becomes a page without them.
    pub fn from_body(value: Value) -> Result<Self, serde_json::Error> {
        if is_envelope(&value) {
            serde_json::from_value(value)
        } else {
            Ok(Page {
                data: serde_json::from_value(value)?,
                total: None,
                page_current: None,
                total_page: None,
            })
        }
    }
}
