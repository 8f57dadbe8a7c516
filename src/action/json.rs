//! Plain JSON actions

use super::{CreateAction, DeleteAction, ListAction, ListParams, LoadAction, UpdateAction};
use crate::error::Result;
use crate::response::{ApiResponse, ApiResult, ListMeta};
use crate::schema::Instance;
use crate::types::{JsonObject, JsonValue, Method, QueryParams};
use crate::visitor::{ItemRef, Visitor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// ============================================================================
// Options
// ============================================================================

/// Query keys and output mode of list actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListOptions {
    /// Query key carrying the filter string
    pub filter_key: Option<String>,
    /// Query key carrying the 1-based page number
    pub page_key: Option<String>,
    /// Query key carrying the offset; suppresses the page key when used
    pub offset_key: Option<String>,
    /// Query key carrying the page size
    pub max_key: Option<String>,
    /// Return hydrated instances instead of extracted rows
    pub raw: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            filter_key: None,
            page_key: Some("page".to_string()),
            offset_key: None,
            max_key: Some("limit".to_string()),
            raw: false,
        }
    }
}

impl ListOptions {
    /// Query string of a list call
    pub fn query(&self, filter: Option<&str>, params: Option<&ListParams>) -> QueryParams {
        let mut query = QueryParams::new();
        if let (Some(filter), Some(key)) = (filter.filter(|f| !f.is_empty()), &self.filter_key) {
            query.insert(key.clone(), filter.to_string());
        }
        let Some(params) = params else {
            return query;
        };

        if let (Some(max), Some(key)) = (params.max, &self.max_key) {
            query.insert(key.clone(), max.to_string());
        }
        let mut page_key = self.page_key.as_ref();
        if let (Some(offset), Some(key)) = (params.offset, &self.offset_key) {
            query.insert(key.clone(), offset.to_string());
            page_key = None;
        }
        if let (Some(max), Some(offset), Some(key)) = (params.max, params.offset, page_key) {
            if max > 0 {
                query.insert(key.clone(), (1 + offset / max).to_string());
            }
        }
        query.extend(
            params
                .extra_args
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        query
    }
}

/// Options of create actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOptions {
    /// Post only the required fields
    pub required_only: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            required_only: true,
        }
    }
}

/// Options of update actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateOptions {
    /// `PATCH` (default) or `PUT`
    pub method: Method,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            method: Method::PATCH,
        }
    }
}

impl UpdateOptions {
    pub fn put() -> Self {
        Self {
            method: Method::PUT,
        }
    }
}

// ============================================================================
// Shared List Flow
// ============================================================================

/// Rows of a plain JSON list body
pub(crate) fn rows(raw: &JsonValue) -> Vec<JsonValue> {
    match raw {
        JsonValue::Array(items) => items.clone(),
        JsonValue::Object(map) => map.values().cloned().collect(),
        _ => Vec::new(),
    }
}

/// Total inferred from a page: one more than what has been seen so far
pub(crate) fn inferred_total(count: usize, params: Option<&ListParams>) -> usize {
    let mut total = count + 1;
    if let Some(max) = params.and_then(|p| p.max) {
        total += params.and_then(|p| p.offset).unwrap_or(max);
    }
    total
}

/// GET the collection, hydrate the rows, and count them
pub(crate) async fn fetch_list<R, T>(
    visitor: &Visitor,
    options: &ListOptions,
    filter: Option<&str>,
    params: Option<&ListParams>,
    extract_rows: R,
    extract_total: T,
) -> Result<ApiResponse>
where
    R: FnOnce(&JsonValue) -> Vec<JsonValue> + Send,
    T: FnOnce(&JsonValue, usize) -> usize + Send,
{
    let query = options.query(filter, params);
    let Some(raw) = visitor
        .connexion()
        .get(visitor.collection_uri(), &query)
        .await
    else {
        return Ok(visitor.respond(false, ApiResult::empty_list()));
    };

    let rows = extract_rows(&raw);
    let instances = visitor.hydrator().hydrate_many(&rows, visitor.model())?;
    let meta = ListMeta {
        current: instances.len(),
        total: extract_total(&raw, rows.len()),
    };
    debug!(
        model = visitor.model(),
        current = meta.current,
        total = meta.total,
        "Listed objects"
    );
    let result = if options.raw {
        ApiResult::Instances(instances)
    } else {
        ApiResult::Items {
            items: visitor.hydrator().extract_many(&instances)?,
            meta,
        }
    };
    Ok(visitor.respond(true, result).with_meta(meta))
}

/// Hydrate a single object body
pub(crate) fn hydrate_body(visitor: &Visitor, raw: &JsonValue) -> Result<Instance> {
    let empty = JsonObject::new();
    let data = raw.as_object().unwrap_or_else(|| {
        warn!(model = visitor.model(), "Response body is not an object");
        &empty
    });
    visitor.hydrator().hydrate(data, visitor.model())
}

// ============================================================================
// Actions
// ============================================================================

/// GET the collection
#[derive(Debug, Clone, Default)]
pub struct JsonList {
    options: ListOptions,
}

impl JsonList {
    pub fn new(options: ListOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ListOptions {
        &self.options
    }
}

#[async_trait]
impl ListAction for JsonList {
    async fn execute(
        &self,
        visitor: &Visitor,
        filter: Option<&str>,
        params: Option<&ListParams>,
    ) -> Result<ApiResponse> {
        fetch_list(visitor, &self.options, filter, params, rows, |_, count| {
            inferred_total(count, params)
        })
        .await
    }
}

/// GET one item
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoad;

#[async_trait]
impl LoadAction for JsonLoad {
    async fn execute(&self, visitor: &Visitor, id: &str) -> Result<ApiResponse> {
        let Some(uri) = visitor.item_uri(ItemRef::Id(id)) else {
            return Ok(visitor.failure());
        };
        let Some(raw) = visitor.connexion().get(&uri, &QueryParams::new()).await else {
            return Ok(visitor.failure());
        };
        let instance = hydrate_body(visitor, &raw)?;
        Ok(visitor.respond(true, ApiResult::Instance(instance)))
    }
}

/// POST to the collection
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCreate {
    options: CreateOptions,
}

impl JsonCreate {
    pub fn new(options: CreateOptions) -> Self {
        Self { options }
    }

    /// Payload posted for an instance
    pub fn payload(
        &self,
        visitor: &Visitor,
        instance: &Instance,
        required_only: Option<bool>,
    ) -> Result<JsonObject> {
        if required_only.unwrap_or(self.options.required_only) {
            visitor.hydrator().extract_required(instance)
        } else {
            visitor.hydrator().extract(instance)
        }
    }
}

#[async_trait]
impl CreateAction for JsonCreate {
    async fn execute(
        &self,
        visitor: &Visitor,
        instance: &Instance,
        required_only: Option<bool>,
    ) -> Result<ApiResponse> {
        let payload = self.payload(visitor, instance, required_only)?;
        if payload.is_empty() {
            warn!(model = visitor.model(), "Nothing to create");
            return Ok(visitor.failure());
        }
        let Some(raw) = visitor
            .connexion()
            .post(visitor.collection_uri(), &JsonValue::Object(payload))
            .await
        else {
            return Ok(visitor.failure());
        };
        let created = hydrate_body(visitor, &raw)?;
        Ok(visitor.respond(true, ApiResult::Instance(created)))
    }
}

/// PATCH (or PUT) one item
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonUpdate {
    options: UpdateOptions,
}

impl JsonUpdate {
    pub fn new(options: UpdateOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl UpdateAction for JsonUpdate {
    async fn execute(
        &self,
        visitor: &Visitor,
        id: &str,
        instance: Option<&Instance>,
    ) -> Result<ApiResponse> {
        let Some(uri) = visitor.item_uri(ItemRef::Id(id)) else {
            return Ok(visitor.failure());
        };
        let payload = instance
            .map(|instance| visitor.hydrator().extract(instance))
            .transpose()?
            .map(JsonValue::Object);
        debug!(model = visitor.model(), id, payload = ?payload, "Updating object");

        let connexion = visitor.connexion();
        let raw = match self.options.method {
            Method::PUT => {
                let body = payload.unwrap_or_else(|| JsonValue::Object(JsonObject::new()));
                connexion.put(&uri, &body).await
            }
            _ => connexion.patch(&uri, payload.as_ref()).await,
        };
        match raw {
            Some(raw) => Ok(visitor.respond(true, ApiResult::Raw(raw))),
            None => Ok(visitor.failure()),
        }
    }
}

/// DELETE one item
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDelete;

#[async_trait]
impl DeleteAction for JsonDelete {
    async fn execute(&self, visitor: &Visitor, target: ItemRef<'_>) -> Result<ApiResponse> {
        let Some(uri) = visitor.item_uri(target) else {
            return Ok(visitor.failure());
        };
        match visitor.connexion().delete(&uri).await {
            Some(raw) => Ok(visitor.respond(true, ApiResult::Raw(raw))),
            None => Ok(visitor.failure()),
        }
    }
}
