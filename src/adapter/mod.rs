//! Adapter module
//!
//! Generic object adapter consumed by the sync framework. One `ApiObject`
//! serves one model through its visitor: field declarations, field reads
//! and writes on the current object, and CRUD entry points. Failures are
//! logged and reported as `None`/`false`; only metadata errors surface as
//! `Err`.

use crate::action::ListParams;
use crate::descriptor::{build_fields, split_list_id, FieldSpec};
use crate::error::Result;
use crate::fields::Updated;
use crate::response::ApiResult;
use crate::schema::Instance;
use crate::types::{JsonObject, JsonValue};
use crate::visitor::{ItemRef, Visitor};
use std::collections::BTreeSet;
use tracing::{debug, error, warn};

// ============================================================================
// Update Tracker
// ============================================================================

/// Parts of the current object written since the last update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTracker {
    object: bool,
    lists: BTreeSet<String>,
}

impl UpdateTracker {
    pub fn need_update(&mut self) {
        self.object = true;
    }

    pub fn need_list_update(&mut self, list: &str) {
        self.lists.insert(list.to_string());
    }

    /// Whether anything must be sent
    pub fn is_needed(&self) -> bool {
        self.object
    }

    pub fn is_list_needed(&self, list: &str) -> bool {
        self.lists.contains(list)
    }

    pub fn clear(&mut self) {
        self.object = false;
        self.lists.clear();
    }
}

// ============================================================================
// Api Object
// ============================================================================

/// Sync adapter of one model
#[derive(Debug)]
pub struct ApiObject {
    visitor: Visitor,
    object: Instance,
    tracker: UpdateTracker,
}

impl ApiObject {
    /// Adapter working on a fresh instance of the visitor model
    pub fn new(visitor: Visitor) -> Result<Self> {
        let object = visitor.descriptor().instantiate(visitor.model())?;
        Ok(Self {
            visitor,
            object,
            tracker: UpdateTracker::default(),
        })
    }

    pub fn model(&self) -> &str {
        self.visitor.model()
    }

    pub fn visitor(&self) -> &Visitor {
        &self.visitor
    }

    /// Current object
    pub fn object(&self) -> &Instance {
        &self.object
    }

    /// Replace the current object and reset the update flags
    pub fn set_object(&mut self, object: Instance) {
        self.object = object;
        self.tracker.clear();
    }

    pub fn tracker(&self) -> &UpdateTracker {
        &self.tracker
    }

    /// Field declarations of the model
    pub fn build_fields(&self) -> Result<Vec<FieldSpec>> {
        build_fields(self.visitor.descriptor(), self.model())
    }

    /// List payload of the visitor
    pub async fn objects_list(
        &self,
        filter: Option<&str>,
        params: Option<&ListParams>,
    ) -> Result<ApiResult> {
        Ok(self.visitor.list(filter, params).await?.into_result())
    }

    // ------------------------------------------------------------------------
    // CRUD
    // ------------------------------------------------------------------------

    /// Fetch one object, `None` on failure
    pub async fn load(&self, id: &str) -> Result<Option<Instance>> {
        debug!(model = self.model(), id, "Loading object");
        let response = self.visitor.load(id).await?;
        if !response.is_success() {
            return Ok(None);
        }
        Ok(response
            .into_instance()
            .filter(|instance| instance.model() == self.model()))
    }

    /// Create an object from raw framework input
    ///
    /// Nothing is sent unless every required field is present.
    pub async fn create(&self, inputs: &JsonObject) -> Result<Option<Instance>> {
        debug!(model = self.model(), "Creating object");
        let Some(candidate) =
            self.visitor
                .getter()
                .required_fields(self.visitor.hydrator(), self.model(), inputs)?
        else {
            return Ok(None);
        };
        let response = self.visitor.create(&candidate, None).await?;
        if !response.is_success() {
            return Ok(None);
        }
        Ok(response
            .into_instance()
            .filter(|instance| instance.model() == self.model()))
    }

    /// Send the current object when `needed`, returning its id
    pub async fn update(&mut self, needed: bool) -> Result<Option<String>> {
        let id = self.object_identifier();
        if !needed {
            return Ok(id);
        }
        let target = id.clone().unwrap_or_default();
        let response = self.visitor.update(&target, Some(&self.object)).await?;
        if !response.is_success() {
            error!("Unable to Update Object ({target}).");
            return Ok(None);
        }
        self.tracker.clear();
        Ok(id)
    }

    /// Delete an object after checking it exists; no id is a no-op success
    pub async fn delete(&self, id: Option<&str>) -> Result<bool> {
        let Some(id) = id.filter(|id| !id.is_empty()) else {
            return Ok(true);
        };
        let Some(object) = self.load(id).await? else {
            warn!("Trying to Delete an Unknown Object ({id}).");
            return Ok(false);
        };
        let response = self.visitor.delete(ItemRef::Instance(&object)).await?;
        Ok(response.is_success())
    }

    /// Id of the current object
    pub fn object_identifier(&self) -> Option<String> {
        self.visitor.item_id(ItemRef::Instance(&self.object))
    }

    // ------------------------------------------------------------------------
    // Simple Fields
    // ------------------------------------------------------------------------

    /// Read a simple or nested field, `None` when not readable
    pub fn get_simple_field(&self, field_id: &str) -> Result<Option<JsonValue>> {
        let getter = self.visitor.getter();
        if !getter.has(self.model(), field_id) {
            return Ok(None);
        }
        getter.get(self.model(), &self.object, field_id).map(Some)
    }

    /// Write a simple or nested field
    ///
    /// `None` leaves the field unhandled. A change flags the object.
    pub fn set_simple_field(&mut self, field_id: &str, value: &JsonValue) -> Result<Updated> {
        let setter = self.visitor.setter();
        if !setter.has(self.visitor.model(), field_id) {
            return Ok(None);
        }
        let updated = setter.set(self.visitor.model(), &mut self.object, field_id, value)?;
        if updated == Some(true) {
            self.tracker.need_update();
        }
        Ok(updated)
    }

    // ------------------------------------------------------------------------
    // List Fields
    // ------------------------------------------------------------------------

    /// Read one item field (`field@list`) across a list resource
    pub fn get_list_field(&self, field_id: &str) -> Result<Option<Vec<JsonValue>>> {
        let Some((list, field)) = split_list_id(field_id) else {
            return Ok(None);
        };
        let descriptor = self.visitor.descriptor();
        if !descriptor.has_field(self.model(), list)
            || descriptor.is_list_resource(self.model(), list)?.is_none()
            || descriptor.is_excluded(self.model(), list)
        {
            return Ok(None);
        }
        self.visitor
            .getter()
            .list_data(self.model(), &self.object, list, field)
            .map(Some)
    }

    /// Replace the items of a list resource
    ///
    /// Excluded and read-only lists are not writable. A change flags both
    /// the object and the list.
    pub fn set_list_field(&mut self, list: &str, items: &[JsonObject]) -> Result<Updated> {
        let descriptor = self.visitor.descriptor();
        if !descriptor.has_field(self.visitor.model(), list)
            || descriptor.is_list_resource(self.visitor.model(), list)?.is_none()
            || descriptor.is_excluded(self.visitor.model(), list)
            || descriptor.is_read_only(self.visitor.model(), list)?
        {
            return Ok(None);
        }
        let updated =
            self.visitor
                .setter()
                .set_list_data(self.visitor.model(), &mut self.object, list, items)?;
        if updated == Some(true) {
            self.tracker.need_update();
            self.tracker.need_list_update(list);
        }
        Ok(updated)
    }

    // ------------------------------------------------------------------------
    // Bulk Access
    // ------------------------------------------------------------------------

    /// Read the requested fields; unreadable ids are left out
    pub fn get_fields<S: AsRef<str>>(&self, field_ids: &[S]) -> Result<JsonObject> {
        let mut out = JsonObject::new();
        for field_id in field_ids {
            let field_id = field_id.as_ref();
            let value = if split_list_id(field_id).is_some() {
                self.get_list_field(field_id)?.map(JsonValue::from)
            } else {
                self.get_simple_field(field_id)?
            };
            if let Some(value) = value {
                out.insert(field_id.to_string(), value);
            }
        }
        Ok(out)
    }

    /// Write every input, returning the entries that were not handled
    pub fn set_fields(&mut self, inputs: &JsonObject) -> Result<JsonObject> {
        let mut remaining = JsonObject::new();
        for (field_id, value) in inputs {
            let handled = match list_items(value) {
                Some(items) if self.is_list(field_id) => self.set_list_field(field_id, &items)?,
                _ => self.set_simple_field(field_id, value)?,
            };
            if handled.is_none() {
                remaining.insert(field_id.clone(), value.clone());
            }
        }
        Ok(remaining)
    }

    fn is_list(&self, field: &str) -> bool {
        let descriptor = self.visitor.descriptor();
        descriptor.has_field(self.model(), field)
            && matches!(descriptor.is_list_resource(self.model(), field), Ok(Some(_)))
    }
}

/// Items of framework list data: an array or a map of objects
fn list_items(value: &JsonValue) -> Option<Vec<JsonObject>> {
    let items: Vec<&JsonValue> = match value {
        JsonValue::Array(items) => items.iter().collect(),
        JsonValue::Object(map) => map.values().collect(),
        _ => return None,
    };
    items
        .into_iter()
        .map(|item| item.as_object().cloned())
        .collect()
}
