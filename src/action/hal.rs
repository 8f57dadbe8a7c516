//! JSON-HAL actions
//!
//! List payloads live under the embedded key, as the first entry of the
//! embedded map. Item payloads may carry an embedded map that is merged
//! over the top-level document before hydration.

use super::json::{fetch_list, hydrate_body, ListOptions};
use super::{ListAction, ListParams, LoadAction};
use crate::error::Result;
use crate::response::{ApiResponse, ApiResult};
use crate::types::{JsonValue, QueryParams};
use crate::visitor::{ItemRef, Visitor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default embedded envelope key
pub const EMBEDDED_KEY: &str = "_embedded";

/// Key (or candidate keys, probed in order) of the list total
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TotalKey {
    One(String),
    Many(Vec<String>),
}

impl Default for TotalKey {
    fn default() -> Self {
        Self::Many(
            ["total", "totalItems", "total_items"]
                .into_iter()
                .map(String::from)
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HalOptions {
    pub embedded: String,
    pub total_key: TotalKey,
}

impl Default for HalOptions {
    fn default() -> Self {
        Self {
            embedded: EMBEDDED_KEY.to_string(),
            total_key: TotalKey::default(),
        }
    }
}

impl HalOptions {
    fn embedded_key(&self) -> &str {
        if self.embedded.is_empty() {
            EMBEDDED_KEY
        } else {
            &self.embedded
        }
    }

    /// Rows of the first embedded collection
    pub fn rows(&self, raw: &JsonValue) -> Vec<JsonValue> {
        let Some(embedded) = raw.get(self.embedded_key()) else {
            warn!("Malformed or empty JSON-HAL response");
            return Vec::new();
        };
        let first = match embedded {
            JsonValue::Object(map) => map.values().next(),
            JsonValue::Array(items) => items.first(),
            _ => None,
        };
        match first {
            Some(JsonValue::Array(items)) if !items.is_empty() => items.clone(),
            Some(JsonValue::Object(map)) if !map.is_empty() => map.values().cloned().collect(),
            _ => {
                warn!("JSON-HAL response has no contents");
                Vec::new()
            }
        }
    }

    /// Server-declared total, `0` when absent
    pub fn total(&self, raw: &JsonValue) -> usize {
        let value = match &self.total_key {
            TotalKey::One(key) => raw.get(key),
            TotalKey::Many(keys) => keys
                .iter()
                .find_map(|key| raw.get(key).filter(|value| !value.is_null())),
        };
        value.map_or(0, count)
    }

    /// Merge the embedded map of an item over the document
    pub fn unwrap_item(&self, raw: &JsonValue) -> JsonValue {
        let mut merged = raw.clone();
        if let Some(embedded) = raw.get(self.embedded_key()) {
            replace_recursive(&mut merged, embedded);
        }
        merged
    }
}

fn count(value: &JsonValue) -> usize {
    match value {
        JsonValue::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or_default() as usize,
        JsonValue::String(text) => text.trim().parse().unwrap_or_default(),
        _ => 0,
    }
}

/// Replace entries of `base` with those of `patch`, descending into
/// objects and arrays present on both sides
fn replace_recursive(base: &mut JsonValue, patch: &JsonValue) {
    match (base, patch) {
        (JsonValue::Object(target), JsonValue::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(key) {
                    Some(slot) => replace_recursive(slot, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (JsonValue::Array(target), JsonValue::Array(source)) => {
            for (index, value) in source.iter().enumerate() {
                match target.get_mut(index) {
                    Some(slot) => replace_recursive(slot, value),
                    None => target.push(value.clone()),
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

// ============================================================================
// Actions
// ============================================================================

/// GET the collection and unwrap the embedded rows
#[derive(Debug, Clone, Default)]
pub struct HalList {
    list: ListOptions,
    hal: HalOptions,
}

impl HalList {
    pub fn new(list: ListOptions, hal: HalOptions) -> Self {
        Self { list, hal }
    }
}

#[async_trait]
impl ListAction for HalList {
    async fn execute(
        &self,
        visitor: &Visitor,
        filter: Option<&str>,
        params: Option<&ListParams>,
    ) -> Result<ApiResponse> {
        fetch_list(
            visitor,
            &self.list,
            filter,
            params,
            |raw| self.hal.rows(raw),
            |raw, _| self.hal.total(raw),
        )
        .await
    }
}

/// GET one item and merge its embedded data
#[derive(Debug, Clone, Default)]
pub struct HalLoad {
    hal: HalOptions,
}

impl HalLoad {
    pub fn new(hal: HalOptions) -> Self {
        Self { hal }
    }
}

#[async_trait]
impl LoadAction for HalLoad {
    async fn execute(&self, visitor: &Visitor, id: &str) -> Result<ApiResponse> {
        let Some(uri) = visitor.item_uri(ItemRef::Id(id)) else {
            return Ok(visitor.failure());
        };
        let Some(raw) = visitor.connexion().get(&uri, &QueryParams::new()).await else {
            return Ok(visitor.failure());
        };
        let instance = hydrate_body(visitor, &self.hal.unwrap_item(&raw))?;
        Ok(visitor.respond(true, ApiResult::Instance(instance)))
    }
}
