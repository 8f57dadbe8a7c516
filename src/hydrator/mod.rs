//! Hydrator module
//!
//! Maps model instances to JSON payloads and back. Extraction honors the
//! field groups declared on the model:
//!
//! - `extract`: fields without groups plus the `Write` group
//! - `extract_required`: `Required` group only
//! - `extract_many`: `List` group only, one map per instance
//!
//! Nulls are always serialized so that clearing a field is expressible.
//! Hydration ignores unknown keys and leaves missing fields at their
//! initial value.

use crate::descriptor::Descriptor;
use crate::error::Result;
use crate::fields::dates;
use crate::schema::{FieldDef, FieldValue, Group, Instance, NativeType, View};
use crate::types::{JsonObject, JsonValue};
use chrono::{FixedOffset, Offset, Utc};
use std::sync::Arc;
use tracing::warn;

/// Bidirectional instance / JSON mapper
#[derive(Debug, Clone)]
pub struct Hydrator {
    descriptor: Arc<Descriptor>,
    timezone: FixedOffset,
}

impl Hydrator {
    /// Create a hydrator reading UTC for naive calendar values
    pub fn new(descriptor: Arc<Descriptor>) -> Self {
        Self {
            descriptor,
            timezone: Utc.fix(),
        }
    }

    /// Timezone used for calendar values without an offset
    #[must_use]
    pub fn with_timezone(mut self, timezone: FixedOffset) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn timezone(&self) -> FixedOffset {
        self.timezone
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn shared_descriptor(&self) -> Arc<Descriptor> {
        Arc::clone(&self.descriptor)
    }

    // ========================================================================
    // Extraction
    // ========================================================================

    /// Full write payload
    pub fn extract(&self, instance: &Instance) -> Result<JsonObject> {
        self.extract_view(instance, View::Write)
    }

    /// Required fields only
    pub fn extract_required(&self, instance: &Instance) -> Result<JsonObject> {
        self.extract_view(instance, View::Required)
    }

    /// Listed fields of each instance, in input order
    pub fn extract_many(&self, instances: &[Instance]) -> Result<Vec<JsonObject>> {
        instances
            .iter()
            .map(|instance| self.extract_view(instance, View::List))
            .collect()
    }

    pub fn extract_view(&self, instance: &Instance, view: View) -> Result<JsonObject> {
        let model = self.descriptor.model(instance.model())?;
        let mut data = JsonObject::new();
        for field in model.fields() {
            if !field.has_storage() || !in_view(field, view) {
                continue;
            }
            let value = instance.value(field.name()).unwrap_or(&FieldValue::Null);
            data.insert(
                field.serialized_name().to_string(),
                self.value_to_json(value, view)?,
            );
        }
        Ok(data)
    }

    fn value_to_json(&self, value: &FieldValue, view: View) -> Result<JsonValue> {
        Ok(match value {
            FieldValue::Null => JsonValue::Null,
            FieldValue::Value(value) => value.clone(),
            FieldValue::DateTime(value) => JsonValue::String(dates::to_wire(value)),
            FieldValue::Object(child) => JsonValue::Object(self.extract_view(child, view)?),
            FieldValue::List(items) => JsonValue::Array(
                items
                    .iter()
                    .map(|item| self.extract_view(item, view).map(JsonValue::Object))
                    .collect::<Result<_>>()?,
            ),
        })
    }

    // ========================================================================
    // Hydration
    // ========================================================================

    /// Build an instance of `model` from a JSON map
    pub fn hydrate(&self, data: &JsonObject, model: &str) -> Result<Instance> {
        let mut instance = self.descriptor.instantiate(model)?;
        for field in self.descriptor.model(model)?.fields() {
            if !field.has_storage() {
                continue;
            }
            if let Some(value) = data.get(field.serialized_name()) {
                let value = self.value_from_json(model, field, value)?;
                instance.insert(field.name(), value);
            }
        }
        Ok(instance)
    }

    /// Hydrate each element; non-map elements yield empty instances
    pub fn hydrate_many(&self, items: &[JsonValue], model: &str) -> Result<Vec<Instance>> {
        let empty = JsonObject::new();
        items
            .iter()
            .map(|item| self.hydrate(item.as_object().unwrap_or(&empty), model))
            .collect()
    }

    fn value_from_json(
        &self,
        model: &str,
        field: &FieldDef,
        value: &JsonValue,
    ) -> Result<FieldValue> {
        if value.is_null() {
            return Ok(FieldValue::Null);
        }
        Ok(match field.native() {
            NativeType::String => match value {
                JsonValue::String(_) => FieldValue::Value(value.clone()),
                JsonValue::Number(n) => FieldValue::from(n.to_string()),
                JsonValue::Bool(flag) => FieldValue::from(flag.to_string()),
                _ => FieldValue::Value(value.clone()),
            },
            NativeType::Bool => match value {
                JsonValue::Bool(_) => FieldValue::Value(value.clone()),
                JsonValue::Number(n) => FieldValue::from(n.as_f64().is_some_and(|n| n != 0.0)),
                JsonValue::String(text) => match text.trim() {
                    "1" | "true" => FieldValue::from(true),
                    "" | "0" | "false" => FieldValue::from(false),
                    _ => FieldValue::Value(value.clone()),
                },
                _ => FieldValue::Value(value.clone()),
            },
            NativeType::Int => match value {
                JsonValue::Number(n) if n.is_i64() || n.is_u64() => {
                    FieldValue::Value(value.clone())
                }
                JsonValue::Number(n) => n
                    .as_f64()
                    .map_or(FieldValue::Null, |f| FieldValue::from(f.trunc() as i64)),
                JsonValue::String(text) => text
                    .trim()
                    .parse::<i64>()
                    .map_or_else(|_| FieldValue::Value(value.clone()), FieldValue::from),
                _ => FieldValue::Value(value.clone()),
            },
            NativeType::Float => match value {
                JsonValue::Number(n) => n.as_f64().map_or(FieldValue::Null, FieldValue::from),
                JsonValue::String(text) => text
                    .trim()
                    .parse::<f64>()
                    .map_or_else(|_| FieldValue::Value(value.clone()), FieldValue::from),
                _ => FieldValue::Value(value.clone()),
            },
            NativeType::DateTime => {
                match value.as_str().and_then(|text| dates::parse(text, &self.timezone)) {
                    Some(parsed) => FieldValue::DateTime(parsed),
                    None => {
                        warn!(model, field = field.name(), %value, "Unable to parse date");
                        FieldValue::Null
                    }
                }
            }
            NativeType::Array | NativeType::Iterable(None) => FieldValue::Value(value.clone()),
            NativeType::Object(target) => match value {
                JsonValue::Object(child) => FieldValue::from(self.hydrate(child, target)?),
                _ => {
                    warn!(model, field = field.name(), "Expected an object for sub-resource");
                    FieldValue::Null
                }
            },
            NativeType::Iterable(Some(item)) => {
                let items: Vec<JsonValue> = match value {
                    JsonValue::Array(items) => items.clone(),
                    JsonValue::Object(map) => map.values().cloned().collect(),
                    _ => {
                        warn!(model, field = field.name(), "Expected a list for list resource");
                        return Ok(FieldValue::Null);
                    }
                };
                FieldValue::List(self.hydrate_many(&items, item)?)
            }
        })
    }
}

fn in_view(field: &FieldDef, view: View) -> bool {
    match view {
        View::Write => field.declared_groups().is_none() || field.has_group(Group::Write),
        View::Required => field.has_group(Group::Required),
        View::List => field.has_group(Group::List),
    }
}
