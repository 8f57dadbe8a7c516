//! Price structures
//!
//! A price is a JSON object carrying at least `ht` (tax excluded), `ttc`
//! (tax included) and `vat` (rate), each a number or a numeric string.
//! `code` holds the ISO currency code when known.

use crate::types::JsonValue;

const AMOUNT_TOLERANCE: f64 = 1e-6;

fn number(value: &JsonValue, key: &str) -> Option<f64> {
    match value.get(key)? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn currency(value: &JsonValue) -> Option<String> {
    value
        .get("code")
        .and_then(JsonValue::as_str)
        .filter(|code| !code.trim().is_empty())
        .map(|code| code.trim().to_uppercase())
}

/// Whether a value has the price structure
pub fn is_valid(value: &JsonValue) -> bool {
    value.is_object()
        && ["ht", "ttc", "vat"]
            .iter()
            .all(|key| number(value, key).is_some())
}

/// Compare two prices
///
/// Amounts match within a small tolerance. Currency codes are compared
/// only when both sides declare one. `None` when either side is invalid.
pub fn same(left: &JsonValue, right: &JsonValue) -> Option<bool> {
    if !is_valid(left) || !is_valid(right) {
        return None;
    }
    let amounts_match = ["ht", "ttc", "vat"].iter().all(|key| {
        match (number(left, key), number(right, key)) {
            (Some(a), Some(b)) => (a - b).abs() < AMOUNT_TOLERANCE,
            _ => false,
        }
    });
    let currency_match = match (currency(left), currency(right)) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    };
    Some(amounts_match && currency_match)
}
