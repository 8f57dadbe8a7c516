//! Visitor module
//!
//! Per-model façade binding a model to its collection and item URIs, to a
//! connexion, and to one action per CRUD verb.
//!
//! # Overview
//!
//! - `Visitor::json` / `Visitor::hal` - pick the action set of a dialect
//! - `list` / `load` / `create` / `update` / `delete` - delegate to actions
//! - `list_with_pagination` - sequential page loop with a hard stop
//! - `item_uri` - id resolution from a string, a map or an instance

use crate::action::{
    CreateAction, DeleteAction, HalList, HalLoad, HalOptions, JsonCreate, JsonDelete, JsonList,
    JsonLoad, JsonUpdate, ListAction, ListOptions, ListParams, LoadAction, UpdateAction,
};
use crate::connexion::{Connexion, LastResponse};
use crate::descriptor::Descriptor;
use crate::error::{Error, Result};
use crate::fields::{Getter, Setter};
use crate::hydrator::Hydrator;
use crate::response::{ApiResponse, ApiResult, ListMeta};
use crate::schema::{FieldValue, Instance};
use crate::types::{Dialect, JsonObject, JsonValue};
use chrono::FixedOffset;
use std::sync::Arc;
use tracing::debug;

/// Placeholder substituted by the item id in item URIs
pub const ID_PLACEHOLDER: &str = "{id}";

// ============================================================================
// Item Reference
// ============================================================================

/// Anything an item id can be read from
#[derive(Debug, Clone, Copy)]
pub enum ItemRef<'a> {
    Id(&'a str),
    /// A map with an `id` entry
    Map(&'a JsonObject),
    /// An instance with an `id` field
    Instance(&'a Instance),
}

impl<'a> From<&'a str> for ItemRef<'a> {
    fn from(id: &'a str) -> Self {
        Self::Id(id)
    }
}

impl<'a> From<&'a String> for ItemRef<'a> {
    fn from(id: &'a String) -> Self {
        Self::Id(id)
    }
}

impl<'a> From<&'a JsonObject> for ItemRef<'a> {
    fn from(map: &'a JsonObject) -> Self {
        Self::Map(map)
    }
}

impl<'a> From<&'a Instance> for ItemRef<'a> {
    fn from(instance: &'a Instance) -> Self {
        Self::Instance(instance)
    }
}

fn scalar_id(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(id) => Some(id.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Default collection URI: `/` + snake-cased short model name + `s`
pub fn default_collection_uri(model: &str) -> String {
    let short = model
        .rsplit(|c: char| matches!(c, '\\' | ':' | '.'))
        .next()
        .unwrap_or(model);
    let mut snake = String::with_capacity(short.len() + 4);
    for (index, ch) in short.chars().enumerate() {
        if ch.is_uppercase() && index > 0 {
            snake.push('_');
        }
        snake.extend(ch.to_lowercase());
    }
    format!("/{snake}s")
}

// ============================================================================
// Visitor
// ============================================================================

pub struct Visitor {
    model: String,
    collection_uri: String,
    item_uri: String,
    connexion: Arc<dyn Connexion>,
    hydrator: Hydrator,
    list_action: Arc<dyn ListAction>,
    load_action: Arc<dyn LoadAction>,
    create_action: Arc<dyn CreateAction>,
    update_action: Arc<dyn UpdateAction>,
    delete_action: Arc<dyn DeleteAction>,
}

impl Visitor {
    /// Visitor speaking plain JSON, with default URIs and actions
    pub fn json(connexion: Arc<dyn Connexion>, hydrator: Hydrator, model: &str) -> Result<Self> {
        if !hydrator.descriptor().contains_model(model) {
            return Err(Error::unknown_model(model));
        }
        let collection_uri = default_collection_uri(model);
        Ok(Self {
            model: model.to_string(),
            item_uri: format!("{collection_uri}/{ID_PLACEHOLDER}"),
            collection_uri,
            connexion,
            hydrator,
            list_action: Arc::new(JsonList::default()),
            load_action: Arc::new(JsonLoad),
            create_action: Arc::new(JsonCreate::default()),
            update_action: Arc::new(JsonUpdate::default()),
            delete_action: Arc::new(JsonDelete),
        })
    }

    /// Visitor speaking JSON-HAL: HAL list and load, JSON writes
    pub fn hal(connexion: Arc<dyn Connexion>, hydrator: Hydrator, model: &str) -> Result<Self> {
        let hal = HalOptions::default();
        Ok(Self::json(connexion, hydrator, model)?
            .with_list_action(HalList::new(ListOptions::default(), hal.clone()))
            .with_load_action(HalLoad::new(hal)))
    }

    pub fn for_dialect(
        dialect: Dialect,
        connexion: Arc<dyn Connexion>,
        hydrator: Hydrator,
        model: &str,
    ) -> Result<Self> {
        match dialect {
            Dialect::Json => Self::json(connexion, hydrator, model),
            Dialect::JsonHal => Self::hal(connexion, hydrator, model),
        }
    }

    // ------------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------------

    /// Override the collection URI; the item URI follows unless set
    /// explicitly afterwards
    #[must_use]
    pub fn with_collection_uri(mut self, uri: impl Into<String>) -> Self {
        self.collection_uri = uri.into();
        self.item_uri = format!("{}/{ID_PLACEHOLDER}", self.collection_uri);
        self
    }

    /// Override the item URI template; must contain `{id}`
    #[must_use]
    pub fn with_item_uri(mut self, uri: impl Into<String>) -> Self {
        self.item_uri = uri.into();
        self
    }

    #[must_use]
    pub fn with_timezone(mut self, timezone: FixedOffset) -> Self {
        self.hydrator = self.hydrator.with_timezone(timezone);
        self
    }

    #[must_use]
    pub fn with_list_action(mut self, action: impl ListAction + 'static) -> Self {
        self.list_action = Arc::new(action);
        self
    }

    #[must_use]
    pub fn with_load_action(mut self, action: impl LoadAction + 'static) -> Self {
        self.load_action = Arc::new(action);
        self
    }

    #[must_use]
    pub fn with_create_action(mut self, action: impl CreateAction + 'static) -> Self {
        self.create_action = Arc::new(action);
        self
    }

    #[must_use]
    pub fn with_update_action(mut self, action: impl UpdateAction + 'static) -> Self {
        self.update_action = Arc::new(action);
        self
    }

    #[must_use]
    pub fn with_delete_action(mut self, action: impl DeleteAction + 'static) -> Self {
        self.delete_action = Arc::new(action);
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn collection_uri(&self) -> &str {
        &self.collection_uri
    }

    pub fn item_uri_template(&self) -> &str {
        &self.item_uri
    }

    pub fn connexion(&self) -> &dyn Connexion {
        self.connexion.as_ref()
    }

    pub fn hydrator(&self) -> &Hydrator {
        &self.hydrator
    }

    pub fn descriptor(&self) -> &Descriptor {
        self.hydrator.descriptor()
    }

    pub fn timezone(&self) -> FixedOffset {
        self.hydrator.timezone()
    }

    pub fn getter(&self) -> Getter<'_> {
        Getter::new(self.descriptor(), self.timezone())
    }

    pub fn setter(&self) -> Setter<'_> {
        Setter::new(self.descriptor(), self.timezone())
    }

    pub fn last_response(&self) -> Option<LastResponse> {
        self.connexion.last_response()
    }

    /// Response carrying the diagnostics of the latest exchange
    pub fn respond(&self, success: bool, result: ApiResult) -> ApiResponse {
        ApiResponse::new(success, result).with_response(self.last_response())
    }

    pub fn failure(&self) -> ApiResponse {
        self.respond(false, ApiResult::None)
    }

    // ------------------------------------------------------------------------
    // Item URIs
    // ------------------------------------------------------------------------

    /// Id of an item reference; empty ids resolve to `None`
    pub fn item_id(&self, target: ItemRef<'_>) -> Option<String> {
        let id = match target {
            ItemRef::Id(id) => Some(id.to_string()),
            ItemRef::Map(map) => map.get("id").and_then(scalar_id),
            ItemRef::Instance(instance) => {
                let stored = match self.descriptor().field(instance.model(), "id") {
                    Ok(def) => def.read_fn().map(|reader| reader(instance)),
                    Err(_) => None,
                };
                match stored.as_ref().or_else(|| instance.value("id")) {
                    Some(FieldValue::Value(value)) => scalar_id(value),
                    _ => None,
                }
            }
        };
        id.filter(|id| !id.trim().is_empty())
    }

    /// Item URI of a reference, `None` when no id can be determined
    pub fn item_uri(&self, target: ItemRef<'_>) -> Option<String> {
        let id = self.item_id(target)?;
        Some(self.item_uri.replace(ID_PLACEHOLDER, &id))
    }

    // ------------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------------

    pub async fn list(
        &self,
        filter: Option<&str>,
        params: Option<&ListParams>,
    ) -> Result<ApiResponse> {
        self.list_action.execute(self, filter, params).await
    }

    /// Load pages until the total, `max_items`, an empty page or a failure
    ///
    /// Issues at most `ceil(max_items / page_size)` requests, each at a new
    /// offset. The response carries the last page's success flag and the
    /// accumulated rows, truncated to `max_items`.
    pub async fn list_with_pagination(
        &self,
        filter: Option<&str>,
        page_size: usize,
        max_items: usize,
    ) -> Result<ApiResponse> {
        let page_size = page_size.max(1);
        let mut result = ApiResult::None;
        let mut success = true;
        let mut cursor = 0;
        let mut total = 0;

        while cursor < max_items {
            let page = self
                .list(filter, Some(&ListParams::page(page_size, cursor)))
                .await?;
            success = page.is_success();
            if !success {
                break;
            }
            cursor += page_size;
            total = page.list_total();
            let count = page.list_count();
            debug!(model = %self.model, cursor, total, count, "Loaded page");
            append(&mut result, page.into_result());
            if count == 0 || cursor >= total {
                break;
            }
        }

        let current = truncate(&mut result, max_items);
        let meta = ListMeta { current, total };
        if let ApiResult::Items { meta: slot, .. } = &mut result {
            *slot = meta;
        }
        Ok(self.respond(success, result).with_meta(meta))
    }

    pub async fn load(&self, id: &str) -> Result<ApiResponse> {
        self.load_action.execute(self, id).await
    }

    pub async fn create(
        &self,
        instance: &Instance,
        required_only: Option<bool>,
    ) -> Result<ApiResponse> {
        self.create_action
            .execute(self, instance, required_only)
            .await
    }

    pub async fn update(&self, id: &str, instance: Option<&Instance>) -> Result<ApiResponse> {
        self.update_action.execute(self, id, instance).await
    }

    pub async fn delete(&self, target: ItemRef<'_>) -> Result<ApiResponse> {
        self.delete_action.execute(self, target).await
    }
}

impl std::fmt::Debug for Visitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visitor")
            .field("model", &self.model)
            .field("collection_uri", &self.collection_uri)
            .field("item_uri", &self.item_uri)
            .field("endpoint", &self.connexion.endpoint())
            .field("list_action", &self.list_action)
            .field("load_action", &self.load_action)
            .field("create_action", &self.create_action)
            .field("update_action", &self.update_action)
            .field("delete_action", &self.delete_action)
            .finish_non_exhaustive()
    }
}

/// Append the rows of a page to the accumulated result
fn append(result: &mut ApiResult, page: ApiResult) {
    if matches!(result, ApiResult::None) {
        *result = page;
        return;
    }
    match (result, page) {
        (ApiResult::Items { items, .. }, ApiResult::Items { items: more, .. }) => {
            items.extend(more);
        }
        (ApiResult::Instances(list), ApiResult::Instances(more)) => list.extend(more),
        _ => {}
    }
}

/// Cap the accumulated rows, returning how many remain
fn truncate(result: &mut ApiResult, max_items: usize) -> usize {
    match result {
        ApiResult::Items { items, .. } => {
            items.truncate(max_items);
            items.len()
        }
        ApiResult::Instances(list) => {
            list.truncate(max_items);
            list.len()
        }
        _ => 0,
    }
}
