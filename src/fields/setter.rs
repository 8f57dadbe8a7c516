//! Field writes
//!
//! Every write reports an [`Updated`] flag:
//! - `Some(true)`: the value changed and was written
//! - `Some(false)`: the value equals the current one, nothing was written
//! - `None`: the field cannot be written or the value is not acceptable

use super::coerce;
use super::getter::{raw, resolve, Getter};
use crate::descriptor::{Descriptor, FieldAddress};
use crate::error::Result;
use crate::schema::{FieldDef, FieldValue, Instance};
use crate::types::{JsonObject, JsonValue};
use chrono::FixedOffset;
use std::collections::VecDeque;

/// Outcome of a write
pub type Updated = Option<bool>;

/// Fold one write outcome into an aggregate; `None` is sticky
pub fn merge(aggregate: Updated, outcome: Updated) -> Updated {
    match (aggregate, outcome) {
        (Some(a), Some(b)) => Some(a || b),
        _ => None,
    }
}

/// Writes framework values into model instances
#[derive(Debug, Clone, Copy)]
pub struct Setter<'a> {
    descriptor: &'a Descriptor,
    timezone: FixedOffset,
}

impl<'a> Setter<'a> {
    pub fn new(descriptor: &'a Descriptor, timezone: FixedOffset) -> Self {
        Self {
            descriptor,
            timezone,
        }
    }

    fn getter(&self) -> Getter<'a> {
        Getter::new(self.descriptor, self.timezone)
    }

    /// Whether a field id can be written on a model
    ///
    /// Excluded and read-only fields are not writable; nested fields are
    /// also read-only when their parent field is.
    pub fn has(&self, model: &str, field_id: &str) -> bool {
        if let Some(prefix) = FieldAddress::parse(field_id).prefix() {
            if self.descriptor.is_read_only(model, prefix).unwrap_or(true) {
                return false;
            }
        }
        let Some((model, field)) = resolve(self.descriptor, model, field_id) else {
            return false;
        };
        self.descriptor.has_field(model, field)
            && !self.descriptor.is_excluded(model, field)
            && !self.descriptor.is_read_only(model, field).unwrap_or(true)
    }

    /// Write one field
    ///
    /// Undeclared and excluded fields report `None`. Nested ids materialize the sub-resource when absent and store it
    /// back into the parent once the nested write changed something.
    pub fn set(
        &self,
        model: &str,
        instance: &mut Instance,
        field_id: &str,
        value: &JsonValue,
    ) -> Result<Updated> {
        if let FieldAddress::Nested { prefix, field } = FieldAddress::parse(field_id) {
            return self.set_nested(model, instance, prefix, field, value);
        }
        if !self.descriptor.has_field(model, field_id)
            || self.descriptor.is_excluded(model, field_id)
        {
            return Ok(None);
        }
        let Some(wire) = self.descriptor.field_type(model, field_id)? else {
            return Ok(None);
        };
        let def = self.descriptor.field(model, field_id)?;
        let Some(stored) = coerce::input(wire, def.native(), value, &self.timezone) else {
            tracing::warn!(model, field = field_id, %value, "Rejected invalid value");
            return Ok(None);
        };

        let current = self.getter().get(model, instance, field_id)?;
        let candidate = coerce::output(wire, &stored, &self.timezone);
        match coerce::same(wire, &current, &candidate) {
            None => return Ok(None),
            Some(true) => return Ok(Some(false)),
            Some(false) => {}
        }
        Ok(write(def, instance, stored))
    }

    fn set_nested(
        &self,
        model: &str,
        instance: &mut Instance,
        prefix: &str,
        field: &str,
        value: &JsonValue,
    ) -> Result<Updated> {
        if !self.descriptor.has_field(model, prefix)
            || self.descriptor.is_excluded(model, prefix)
            || self.descriptor.is_sub_resource(model, prefix)?.is_none()
        {
            return Ok(None);
        }
        let target = self.descriptor.sub_resource_model(model, prefix)?;
        let mut child = match raw(self.descriptor, model, instance, prefix)? {
            FieldValue::Object(child) => *child,
            _ => self.descriptor.instantiate(target)?,
        };
        let updated = self.set(target, &mut child, field, value)?;
        if updated != Some(true) {
            return Ok(updated);
        }
        let def = self.descriptor.field(model, prefix)?;
        Ok(write(def, instance, FieldValue::from(child)))
    }

    /// Write several fields; the aggregate is `None` if any write was
    pub fn set_multi(
        &self,
        model: &str,
        instance: &mut Instance,
        fields: &JsonObject,
    ) -> Result<Updated> {
        let mut updated = Some(false);
        for (field_id, value) in fields {
            updated = merge(updated, self.set(model, instance, field_id, value)?);
        }
        Ok(updated)
    }

    /// Replace the items of a list resource
    ///
    /// New entries are applied in order onto the stored items, creating
    /// fresh items once the stored list is exhausted. Leftover stored items
    /// are dropped. The list is stored again only when something changed.
    pub fn set_list_data(
        &self,
        model: &str,
        instance: &mut Instance,
        list_field: &str,
        items: &[JsonObject],
    ) -> Result<Updated> {
        let item_model = self.descriptor.list_resource_model(model, list_field)?;
        let mut origin: VecDeque<Instance> = match raw(self.descriptor, model, instance, list_field)? {
            FieldValue::List(stored) => stored.into(),
            _ => VecDeque::new(),
        };

        let mut updated = Some(origin.len() != items.len());
        let mut rebuilt = Vec::with_capacity(items.len());
        for data in items {
            let mut item = match origin.pop_front() {
                Some(item) => item,
                None => self.descriptor.instantiate(item_model)?,
            };
            updated = merge(updated, self.set_multi(item_model, &mut item, data)?);
            rebuilt.push(item);
        }

        if updated != Some(true) {
            return Ok(updated);
        }
        let def = self.descriptor.field(model, list_field)?;
        Ok(write(def, instance, FieldValue::List(rebuilt)))
    }
}

/// Store a value through the writer, else directly
fn write(def: &FieldDef, instance: &mut Instance, value: FieldValue) -> Updated {
    if let Some(writer) = def.write_fn() {
        writer(instance, value);
        return Some(true);
    }
    if def.has_storage() {
        instance.insert(def.name(), value);
        return Some(true);
    }
    None
}
