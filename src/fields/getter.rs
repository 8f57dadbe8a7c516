//! Field reads

use super::coerce;
use crate::descriptor::{Descriptor, FieldAddress};
use crate::error::Result;
use crate::hydrator::Hydrator;
use crate::schema::{FieldValue, Instance};
use crate::types::{JsonObject, JsonValue};
use chrono::FixedOffset;

/// Reads framework values out of model instances
#[derive(Debug, Clone, Copy)]
pub struct Getter<'a> {
    descriptor: &'a Descriptor,
    timezone: FixedOffset,
}

impl<'a> Getter<'a> {
    pub fn new(descriptor: &'a Descriptor, timezone: FixedOffset) -> Self {
        Self {
            descriptor,
            timezone,
        }
    }

    /// Whether a field id can be read on a model
    ///
    /// Nested ids are resolved against the sub-resource model. Excluded and
    /// write-only fields are not readable.
    pub fn has(&self, model: &str, field_id: &str) -> bool {
        let Some((model, field)) = resolve(self.descriptor, model, field_id) else {
            return false;
        };
        self.descriptor.has_field(model, field)
            && !self.descriptor.is_excluded(model, field)
            && !self.descriptor.is_write_only(model, field).unwrap_or(true)
    }

    /// Read one field, coerced to its wire type
    ///
    /// Excluded fields and fields without a resolvable wire type read as
    /// `null`.
    pub fn get(&self, model: &str, instance: &Instance, field_id: &str) -> Result<JsonValue> {
        if let FieldAddress::Nested { prefix, field } = FieldAddress::parse(field_id) {
            if self.descriptor.is_excluded(model, prefix) {
                return Ok(JsonValue::Null);
            }
            let target = self.descriptor.sub_resource_model(model, prefix)?;
            return match raw(self.descriptor, model, instance, prefix)? {
                FieldValue::Object(child) => self.get(target, &child, field),
                _ => {
                    let empty = self.descriptor.instantiate(target)?;
                    self.get(target, &empty, field)
                }
            };
        }
        if self.descriptor.is_excluded(model, field_id) {
            return Ok(JsonValue::Null);
        }
        let Some(wire) = self.descriptor.field_type(model, field_id)? else {
            return Ok(JsonValue::Null);
        };
        let value = raw(self.descriptor, model, instance, field_id)?;
        Ok(coerce::output(wire, &value, &self.timezone))
    }

    /// Whether a field holds non-empty data
    pub fn exists(&self, model: &str, instance: &Instance, field: &str) -> Result<bool> {
        Ok(match raw(self.descriptor, model, instance, field)? {
            FieldValue::Null => false,
            FieldValue::Value(value) => !coerce::is_empty(&value),
            FieldValue::List(items) => !items.is_empty(),
            FieldValue::DateTime(_) | FieldValue::Object(_) => true,
        })
    }

    /// Read one item field across a list resource
    ///
    /// Positions follow the stored list. Items whose model does not declare
    /// `item_field` yield `null` at their position.
    pub fn list_data(
        &self,
        model: &str,
        instance: &Instance,
        list_field: &str,
        item_field: &str,
    ) -> Result<Vec<JsonValue>> {
        let item_model = self.descriptor.list_resource_model(model, list_field)?;
        let FieldValue::List(items) = raw(self.descriptor, model, instance, list_field)? else {
            return Ok(Vec::new());
        };
        items
            .iter()
            .map(|item| {
                if self.descriptor.has_field(item_model, item_field) {
                    self.get(item_model, item, item_field)
                } else {
                    Ok(JsonValue::Null)
                }
            })
            .collect()
    }

    /// Build a new instance from raw framework input
    ///
    /// Every required field must be present and non-empty; otherwise the
    /// missing field is logged and `None` is returned.
    pub fn required_fields(
        &self,
        hydrator: &Hydrator,
        model: &str,
        inputs: &JsonObject,
    ) -> Result<Option<Instance>> {
        let mut data = JsonObject::new();
        for field_id in self.descriptor.required_fields(model)? {
            let value = inputs.get(field_id).unwrap_or(&JsonValue::Null);
            if coerce::is_empty(value) {
                tracing::error!(model, field = %field_id, "Required field is missing");
                return Ok(None);
            }
            let def = self.descriptor.field(model, field_id)?;
            let coerced = match self.descriptor.field_type(model, field_id)? {
                Some(wire) => {
                    coerce::output(wire, &FieldValue::from_json(value.clone()), &self.timezone)
                }
                None => value.clone(),
            };
            data.insert(def.serialized_name().to_string(), coerced);
        }
        hydrator.hydrate(&data, model).map(Some)
    }

    pub fn timezone(&self) -> FixedOffset {
        self.timezone
    }
}

/// Resolve a possibly nested field id to `(model, field)`
pub(crate) fn resolve<'d, 'f>(
    descriptor: &'d Descriptor,
    model: &'d str,
    field_id: &'f str,
) -> Option<(&'d str, &'f str)> {
    match FieldAddress::parse(field_id) {
        FieldAddress::Flat(field) => Some((model, field)),
        FieldAddress::Nested { prefix, field } => {
            descriptor.is_sub_resource(model, prefix).ok()??;
            let target = descriptor.sub_resource_model(model, prefix).ok()?;
            Some((target, field))
        }
    }
}

/// Raw data of a field: reader first, then stored value
pub(crate) fn raw(
    descriptor: &Descriptor,
    model: &str,
    instance: &Instance,
    field: &str,
) -> Result<FieldValue> {
    let def = descriptor.field(model, field)?;
    if let Some(reader) = def.read_fn() {
        return Ok(reader(instance));
    }
    Ok(instance.value(field).cloned().unwrap_or_default())
}
