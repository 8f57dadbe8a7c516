//! Failure diagnostics
//!
//! Logs the status line, the URL, the scalar entries of the response body
//! (or the raw body when it is not JSON) and every response header.

use super::LastResponse;
use crate::types::JsonValue;
use reqwest::StatusCode;
use tracing::{error, warn};

pub(crate) fn log_failure(last: &LastResponse) {
    let status = last.status.unwrap_or_default();
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown Status");
    error!("{status} => {reason}");
    error!("Url => {}", last.url);
    log_body(last.body.as_deref().unwrap_or_default());
    for (key, value) in &last.headers {
        warn!("{key} -> {value}");
    }
}

fn log_body(body: &str) {
    match serde_json::from_str::<JsonValue>(body) {
        Ok(JsonValue::Object(map)) => {
            for (key, value) in &map {
                if let Some(text) = scalar(value) {
                    error!("{key} -> {text}");
                }
            }
        }
        Ok(JsonValue::Array(items)) => {
            for (index, value) in items.iter().enumerate() {
                if let Some(text) = scalar(value) {
                    error!("{index} -> {text}");
                }
            }
        }
        _ if body.trim().is_empty() => {}
        _ => error!("{body}"),
    }
}

fn scalar(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(text) => Some(text.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
