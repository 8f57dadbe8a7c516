//! Model metadata registry
//!
//! Answers type, flag and relation queries about `(model, field)` pairs.
//! Models are registered once at startup; the registry is then shared
//! read-only (usually behind an `Arc`) by the accessors, the hydrator and
//! every visitor.

use crate::error::{Error, Result};
use crate::schema::{FieldDef, Group, Instance, ModelDef, NativeType, WireType};
use once_cell::sync::OnceCell;
use std::collections::HashMap;

/// Field excluded from generic access when a model declares no exclusions
pub const DEFAULT_EXCLUDED: &str = "id";

struct ModelEntry {
    def: ModelDef,
    index: HashMap<String, usize>,
    required: OnceCell<Vec<String>>,
}

impl ModelEntry {
    fn new(def: ModelDef) -> Result<Self> {
        let mut index = HashMap::with_capacity(def.fields().len());
        for (position, field) in def.fields().iter().enumerate() {
            if field.name().is_empty() {
                return Err(Error::config(format!(
                    "Model '{}' declares a field without name",
                    def.name()
                )));
            }
            if index.insert(field.name().to_string(), position).is_some() {
                return Err(Error::config(format!(
                    "Model '{}' declares field '{}' twice",
                    def.name(),
                    field.name()
                )));
            }
            if field.forced_wire().is_some()
                && matches!(field.native(), NativeType::Object(_) | NativeType::Iterable(_))
            {
                return Err(Error::config(format!(
                    "Relation field '{}::{}' cannot force a wire type",
                    def.name(),
                    field.name()
                )));
            }
        }
        Ok(Self {
            def,
            index,
            required: OnceCell::new(),
        })
    }

    fn field(&self, name: &str) -> Option<&FieldDef> {
        self.index.get(name).map(|&position| &self.def.fields()[position])
    }
}

/// Registry of declared models
#[derive(Default)]
pub struct Descriptor {
    models: HashMap<String, ModelEntry>,
}

impl Descriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a set of model definitions
    pub fn from_models(models: impl IntoIterator<Item = ModelDef>) -> Result<Self> {
        let mut descriptor = Self::new();
        for model in models {
            descriptor.register(model)?;
        }
        Ok(descriptor)
    }

    /// Register a model definition
    pub fn register(&mut self, model: ModelDef) -> Result<()> {
        if model.name().is_empty() {
            return Err(Error::config("Model name cannot be empty"));
        }
        if self.models.contains_key(model.name()) {
            return Err(Error::config(format!(
                "Model '{}' is already registered",
                model.name()
            )));
        }
        let entry = ModelEntry::new(model)?;
        self.models.insert(entry.def.name().to_string(), entry);
        Ok(())
    }

    /// Override the exclusion list of a registered model
    pub fn set_exclusions(&mut self, model: &str, fields: Vec<String>) -> Result<()> {
        let entry = self
            .models
            .get_mut(model)
            .ok_or_else(|| Error::unknown_model(model))?;
        entry.def.set_exclusions(fields);
        Ok(())
    }

    // ========================================================================
    // Models
    // ========================================================================

    pub fn contains_model(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    /// Registered model names, sorted
    pub fn model_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn model(&self, model: &str) -> Result<&ModelDef> {
        self.entry(model).map(|entry| &entry.def)
    }

    /// Whether a model is registered and declares at least one field
    pub fn is_structured(&self, model: &str) -> bool {
        self.models
            .get(model)
            .is_some_and(|entry| !entry.def.fields().is_empty())
    }

    /// Fresh instance of a model, holding declared initial values
    pub fn instantiate(&self, model: &str) -> Result<Instance> {
        let entry = self.entry(model)?;
        let mut instance = Instance::new(model);
        for field in entry.def.fields() {
            if field.has_storage() && !field.initial_value().is_null() {
                instance.insert(field.name(), field.initial_value().clone());
            }
        }
        Ok(instance)
    }

    fn entry(&self, model: &str) -> Result<&ModelEntry> {
        self.models
            .get(model)
            .ok_or_else(|| Error::unknown_model(model))
    }

    // ========================================================================
    // Fields
    // ========================================================================

    /// Whether a model declares a field; false for unknown models
    pub fn has_field(&self, model: &str, field: &str) -> bool {
        self.models
            .get(model)
            .is_some_and(|entry| entry.index.contains_key(field))
    }

    pub fn field(&self, model: &str, field: &str) -> Result<&FieldDef> {
        self.entry(model)?
            .field(field)
            .ok_or_else(|| Error::resolution(model, field, "field is not declared"))
    }

    /// Wire type of a field: forced type first, then inferred from storage
    ///
    /// `None` means the field cannot be managed generically.
    pub fn field_type(&self, model: &str, field: &str) -> Result<Option<WireType>> {
        let def = self.field(model, field)?;
        Ok(def.forced_wire().or_else(|| def.native().inferred_wire_type()))
    }

    pub fn is_required(&self, model: &str, field: &str) -> Result<bool> {
        Ok(self.field(model, field)?.has_group(Group::Required))
    }

    pub fn is_listed(&self, model: &str, field: &str) -> Result<bool> {
        Ok(self.field(model, field)?.has_group(Group::List))
    }

    pub fn is_logged(&self, model: &str, field: &str) -> Result<bool> {
        Ok(self.field(model, field)?.has_group(Group::Log))
    }

    pub fn is_no_test(&self, model: &str, field: &str) -> Result<bool> {
        Ok(self.field(model, field)?.has_group(Group::NoTest))
    }

    /// Explicitly read-only, or in `Read` without `Write`
    pub fn is_read_only(&self, model: &str, field: &str) -> Result<bool> {
        Ok(field_is_read_only(self.field(model, field)?))
    }

    /// In `Write` without `Read`
    pub fn is_write_only(&self, model: &str, field: &str) -> Result<bool> {
        Ok(field_is_write_only(self.field(model, field)?))
    }

    /// Whether a field is listed in the model exclusions (default `id`)
    pub fn is_excluded(&self, model: &str, field: &str) -> bool {
        let Some(entry) = self.models.get(model) else {
            return false;
        };
        match entry.def.exclusions() {
            Some(excluded) => excluded.iter().any(|name| name == field),
            None => field == DEFAULT_EXCLUDED,
        }
    }

    /// Required field names, computed once per model
    pub fn required_fields(&self, model: &str) -> Result<&[String]> {
        let entry = self.entry(model)?;
        let required = entry.required.get_or_init(|| {
            entry
                .def
                .fields()
                .iter()
                .filter(|field| field.has_group(Group::Required))
                .map(|field| field.name().to_string())
                .collect()
        });
        Ok(required)
    }

    // ========================================================================
    // Relations
    // ========================================================================

    /// Prefix of a sub-resource field, if the field holds one
    ///
    /// The target must be a registered model with its own fields.
    pub fn is_sub_resource<'a>(&self, model: &str, field: &'a str) -> Result<Option<&'a str>> {
        match self.field(model, field)?.native() {
            NativeType::Object(target) if self.is_structured(target) => Ok(Some(field)),
            _ => Ok(None),
        }
    }

    /// Model held by a sub-resource field
    pub fn sub_resource_model(&self, model: &str, field: &str) -> Result<&str> {
        match self.field(model, field)?.native() {
            NativeType::Object(target) => Ok(target),
            other => Err(Error::resolution(
                model,
                field,
                format!("{other:?} is not a sub-resource"),
            )),
        }
    }

    /// Prefix of a list-resource field, if the field holds one
    ///
    /// Unknown fields are not list resources.
    pub fn is_list_resource<'a>(&self, model: &str, field: &'a str) -> Result<Option<&'a str>> {
        let entry = self.entry(model)?;
        let Some(def) = entry.field(field) else {
            return Ok(None);
        };
        match def.native() {
            NativeType::Iterable(Some(item)) if self.is_structured(item) => Ok(Some(field)),
            _ => Ok(None),
        }
    }

    /// Item model of a list-resource field
    pub fn list_resource_model(&self, model: &str, field: &str) -> Result<&str> {
        match self.field(model, field)?.native() {
            NativeType::Iterable(Some(item)) => Ok(item),
            NativeType::Iterable(None) => Err(Error::resolution(
                model,
                field,
                "list resource declares no item type",
            )),
            other => Err(Error::resolution(
                model,
                field,
                format!("{other:?} is not a list resource"),
            )),
        }
    }

    /// Check that every relation points to a registered model
    pub fn validate_relations(&self) -> Result<()> {
        for entry in self.models.values() {
            for field in entry.def.fields() {
                let target = match field.native() {
                    NativeType::Object(target) | NativeType::Iterable(Some(target)) => target,
                    _ => continue,
                };
                if !self.contains_model(target) {
                    return Err(Error::resolution(
                        entry.def.name(),
                        field.name(),
                        format!("relation targets unregistered model '{target}'"),
                    ));
                }
            }
        }
        tracing::debug!(models = self.models.len(), "Model relations validated");
        Ok(())
    }
}

impl std::fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descriptor")
            .field("models", &self.model_names())
            .finish()
    }
}

pub(crate) fn field_is_read_only(field: &FieldDef) -> bool {
    field.is_flagged_read_only()
        || (field.has_group(Group::Read) && !field.has_group(Group::Write))
}

pub(crate) fn field_is_write_only(field: &FieldDef) -> bool {
    field.has_group(Group::Write) && !field.has_group(Group::Read)
}
