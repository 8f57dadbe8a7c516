//! Uniform outcome of every action
//!
//! Each action builds exactly one [`ApiResponse`], including on early
//! exits, so callers always read the same success/result/metadata shape.

use crate::connexion::LastResponse;
use crate::schema::Instance;
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

/// Counters of a list response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    /// Items in this response
    pub current: usize,
    /// Items on the server, declared or inferred
    pub total: usize,
}

/// Payload of a response
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ApiResult {
    #[default]
    None,
    /// A hydrated record (load, create)
    Instance(Instance),
    /// Hydrated records of a raw-mode list
    Instances(Vec<Instance>),
    /// Extracted list rows with their counters attached
    Items { items: Vec<JsonObject>, meta: ListMeta },
    /// Body returned by the API as is (update, delete)
    Raw(JsonValue),
}

impl ApiResult {
    /// Empty list payload with zero counters
    pub fn empty_list() -> Self {
        Self::Items {
            items: Vec::new(),
            meta: ListMeta::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResponse {
    success: bool,
    result: ApiResult,
    meta: Option<ListMeta>,
    response: Option<LastResponse>,
}

impl ApiResponse {
    /// A failed response without payload
    pub fn failure() -> Self {
        Self::default()
    }

    pub fn new(success: bool, result: ApiResult) -> Self {
        Self {
            success,
            result,
            meta: None,
            response: None,
        }
    }

    /// Attach list counters
    #[must_use]
    pub fn with_meta(mut self, meta: ListMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Attach the diagnostics of the exchange that produced this response
    #[must_use]
    pub fn with_response(mut self, response: Option<LastResponse>) -> Self {
        self.response = response;
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn result(&self) -> &ApiResult {
        &self.result
    }

    pub fn into_result(self) -> ApiResult {
        self.result
    }

    pub fn meta(&self) -> Option<ListMeta> {
        self.meta
    }

    pub fn last_response(&self) -> Option<&LastResponse> {
        self.response.as_ref()
    }

    /// Hydrated record, when the payload is one
    pub fn instance(&self) -> Option<&Instance> {
        match &self.result {
            ApiResult::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn into_instance(self) -> Option<Instance> {
        match self.result {
            ApiResult::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// Items of a list response, `0` when absent
    pub fn list_count(&self) -> usize {
        self.meta.map_or(0, |meta| meta.current)
    }

    /// Declared or inferred total of a list response, `0` when absent
    pub fn list_total(&self) -> usize {
        self.meta.map_or(0, |meta| meta.total)
    }

    /// JSON rendering of an extracted or raw payload
    ///
    /// Lists render as their rows plus a `meta` entry. Hydrated records
    /// need the hydrator and render as `null` here.
    pub fn payload(&self) -> JsonValue {
        match &self.result {
            ApiResult::Items { items, meta } => serde_json::json!({
                "items": items,
                "meta": meta,
            }),
            ApiResult::Raw(value) => value.clone(),
            ApiResult::None | ApiResult::Instance(_) | ApiResult::Instances(_) => JsonValue::Null,
        }
    }
}
