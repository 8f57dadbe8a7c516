//! Wire type coercions
//!
//! `output` turns stored data into the value exchanged with the sync
//! framework, `input` does the reverse, `same` is the type-aware equality
//! used to skip no-op writes.

use super::{dates, price};
use crate::schema::{FieldValue, NativeType, WireType};
use crate::types::JsonValue;
use chrono::{DateTime, FixedOffset};

/// Framework value of stored data
pub(crate) fn output(wire: WireType, raw: &FieldValue, timezone: &FixedOffset) -> JsonValue {
    match wire {
        wire if wire.is_text() => JsonValue::String(text(raw, timezone)),
        WireType::Bool => JsonValue::Bool(truthy(raw)),
        WireType::Int => JsonValue::from(integer(raw)),
        WireType::Float => JsonValue::from(float(raw)),
        WireType::Date => calendar(raw, timezone)
            .map(|value| JsonValue::String(dates::format_date(&value, timezone)))
            .unwrap_or(JsonValue::Null),
        WireType::DateTime => calendar(raw, timezone)
            .map(|value| JsonValue::String(dates::format_datetime(&value, timezone)))
            .unwrap_or(JsonValue::Null),
        WireType::Price => match raw.as_json() {
            Some(value) if price::is_valid(value) => value.clone(),
            Some(value) => {
                tracing::warn!(%value, "Discarding malformed price");
                JsonValue::Null
            }
            None => JsonValue::Null,
        },
        _ => raw.as_json().cloned().unwrap_or(JsonValue::Null),
    }
}

/// Stored data for a framework value; `None` when the value is invalid
pub(crate) fn input(
    wire: WireType,
    native: &NativeType,
    value: &JsonValue,
    timezone: &FixedOffset,
) -> Option<FieldValue> {
    match wire {
        WireType::Date | WireType::DateTime => {
            let text = match value {
                JsonValue::Null => return Some(FieldValue::Null),
                JsonValue::String(text) if text.trim().is_empty() => {
                    return Some(FieldValue::Null)
                }
                JsonValue::String(text) => text,
                _ => return None,
            };
            let parsed = dates::parse(text, timezone)?;
            if *native == NativeType::DateTime {
                return Some(FieldValue::DateTime(parsed));
            }
            let formatted = if wire == WireType::Date {
                dates::format_date(&parsed, timezone)
            } else {
                dates::format_datetime(&parsed, timezone)
            };
            Some(FieldValue::from(formatted))
        }
        WireType::Price => match value {
            JsonValue::Null => Some(FieldValue::Null),
            value if price::is_valid(value) => Some(FieldValue::Value(value.clone())),
            _ => None,
        },
        WireType::File | WireType::Image | WireType::Stream => {
            Some(FieldValue::from_json(value.clone()))
        }
        scalar => Some(FieldValue::from_json(output(
            scalar,
            &FieldValue::from_json(value.clone()),
            timezone,
        ))),
    }
}

/// Type-aware equality of two framework values
///
/// `None` when the wire type has no defined equality.
pub(crate) fn same(wire: WireType, current: &JsonValue, candidate: &JsonValue) -> Option<bool> {
    match wire {
        WireType::Price => match (current, candidate) {
            (JsonValue::Null, JsonValue::Null) => Some(true),
            (JsonValue::Null, _) | (_, JsonValue::Null) => Some(false),
            (current, candidate) => price::same(current, candidate),
        },
        WireType::File | WireType::Image => {
            let checksum = |value: &JsonValue| {
                value
                    .get("md5")
                    .and_then(JsonValue::as_str)
                    .map(str::to_string)
            };
            match (checksum(current), checksum(candidate)) {
                (Some(a), Some(b)) => Some(a == b),
                _ => Some(current == candidate),
            }
        }
        WireType::Stream => None,
        _ => Some(current == candidate),
    }
}

/// Null, blank string, or empty container
pub fn is_empty(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(text) => text.trim().is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(map) => map.is_empty(),
        JsonValue::Bool(_) | JsonValue::Number(_) => false,
    }
}

// ============================================================================
// Scalar casts
// ============================================================================

fn text(raw: &FieldValue, timezone: &FixedOffset) -> String {
    match raw {
        FieldValue::Null | FieldValue::Object(_) | FieldValue::List(_) => String::new(),
        FieldValue::DateTime(value) => dates::format_datetime(value, timezone),
        FieldValue::Value(JsonValue::String(text)) => text.clone(),
        FieldValue::Value(JsonValue::Null) => String::new(),
        FieldValue::Value(value) => value.to_string(),
    }
}

fn truthy(raw: &FieldValue) -> bool {
    match raw {
        FieldValue::Null => false,
        FieldValue::DateTime(_) | FieldValue::Object(_) => true,
        FieldValue::List(items) => !items.is_empty(),
        FieldValue::Value(value) => match value {
            JsonValue::Null => false,
            JsonValue::Bool(flag) => *flag,
            JsonValue::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            JsonValue::String(text) => {
                let text = text.trim();
                !text.is_empty() && text != "0" && !text.eq_ignore_ascii_case("false")
            }
            JsonValue::Array(items) => !items.is_empty(),
            JsonValue::Object(map) => !map.is_empty(),
        },
    }
}

fn integer(raw: &FieldValue) -> i64 {
    match raw {
        FieldValue::Value(JsonValue::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or_default(),
        FieldValue::Value(JsonValue::String(text)) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().map(|f| f.trunc() as i64))
                .unwrap_or_default()
        }
        FieldValue::Value(JsonValue::Bool(flag)) => i64::from(*flag),
        _ => 0,
    }
}

fn float(raw: &FieldValue) -> f64 {
    match raw {
        FieldValue::Value(JsonValue::Number(n)) => n.as_f64().unwrap_or_default(),
        FieldValue::Value(JsonValue::String(text)) => text.trim().parse().unwrap_or_default(),
        FieldValue::Value(JsonValue::Bool(flag)) => f64::from(u8::from(*flag)),
        _ => 0.0,
    }
}

fn calendar(raw: &FieldValue, timezone: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    match raw {
        FieldValue::DateTime(value) => Some(*value),
        FieldValue::Value(JsonValue::String(text)) => dates::parse(text, timezone),
        _ => None,
    }
}
