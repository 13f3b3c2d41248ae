//! Field formatters used in structured log events.

use crate::message::JsonObject;

/// Compact JSON rendering of a message body.
pub fn format_body(body: &JsonObject) -> String {
    serde_json::to_string(body).unwrap_or_else(|_| "<unprintable>".to_string())
}

/// Lossy UTF-8 rendering of an undecoded delivery body.
pub fn format_raw_body(body: &[u8]) -> String {
    String::from_utf8_lossy(body).into_owned()
}
