//! Loader types
//!
//! Declarative model definition types for YAML parsing.

use crate::error::{Error, Result};
use crate::schema::{FieldDef, FieldValue, Group, ModelDef, NativeType, WireType};
use crate::types::{JsonValue, SyncPreference};
use serde::{Deserialize, Serialize};

// ============================================================================
// Schema Definition
// ============================================================================

/// Top-level definition file: a list of models
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDefinition {
    #[serde(default)]
    pub models: Vec<ModelDefinition>,
}

/// One model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModelDefinition {
    pub name: String,
    /// Overrides the default exclusion list
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl ModelDefinition {
    pub fn to_model_def(&self) -> Result<ModelDef> {
        let mut model = ModelDef::new(&self.name);
        for field in &self.fields {
            model = model.field(field.to_field_def(&self.name)?);
        }
        if let Some(exclude) = &self.exclude {
            model = model.exclude(exclude.iter().cloned());
        }
        Ok(model)
    }
}

// ============================================================================
// Field Definition
// ============================================================================

/// Storage type of a declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Bool,
    Int,
    Float,
    Datetime,
    Array,
    /// Nested record, `target` names its model
    Object,
    /// Collection of records, `target` names the item model when known
    List,
}

/// Allowed value of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceDefinition {
    pub value: String,
    pub label: String,
}

/// Schema.org style annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MicrodataDefinition {
    pub item_type: String,
    pub item_prop: String,
}

/// One field of a model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Related model of `object` and `list` fields
    #[serde(default)]
    pub target: Option<String>,
    /// Forced wire type
    #[serde(default)]
    pub wire: Option<WireType>,
    /// Explicit groups; an empty list means none declared
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub read_only: bool,
    /// UI group label
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChoiceDefinition>,
    #[serde(default)]
    pub microdata: Option<MicrodataDefinition>,
    #[serde(default)]
    pub prefer: Option<SyncPreference>,
    #[serde(default)]
    pub serialized_name: Option<String>,
    #[serde(default)]
    pub default: Option<JsonValue>,
}

impl FieldDefinition {
    fn native(&self, model: &str) -> Result<NativeType> {
        Ok(match self.kind {
            FieldKind::String => NativeType::String,
            FieldKind::Bool => NativeType::Bool,
            FieldKind::Int => NativeType::Int,
            FieldKind::Float => NativeType::Float,
            FieldKind::Datetime => NativeType::DateTime,
            FieldKind::Array => NativeType::Array,
            FieldKind::Object => match &self.target {
                Some(target) => NativeType::Object(target.clone()),
                None => {
                    return Err(Error::config(format!(
                        "Field '{model}::{}' of type object needs a target",
                        self.name
                    )))
                }
            },
            FieldKind::List => NativeType::Iterable(self.target.clone()),
        })
    }

    pub fn to_field_def(&self, model: &str) -> Result<FieldDef> {
        let mut field = FieldDef::new(&self.name, self.native(model)?);
        if self.wire.is_some() && matches!(self.kind, FieldKind::Object | FieldKind::List) {
            return Err(Error::config(format!(
                "Field '{model}::{}' of type {} cannot declare a wire type",
                self.name,
                if self.kind == FieldKind::Object { "object" } else { "list" }
            )));
        }
        if let Some(wire) = self.wire {
            field = field.wire(wire);
        }
        if !self.groups.is_empty() {
            field = field.groups(self.groups.iter().copied());
        }
        if self.read_only {
            field = field.read_only();
        }
        if let Some(label) = &self.group {
            field = field.label(label);
        }
        if let Some(description) = &self.description {
            field = field.describe(description);
        }
        for choice in &self.choices {
            field = field.choice(&choice.value, &choice.label);
        }
        if let Some(microdata) = &self.microdata {
            field = field.microdata(&microdata.item_type, &microdata.item_prop);
        }
        if let Some(prefer) = self.prefer {
            field = field.prefer(prefer);
        }
        if let Some(key) = &self.serialized_name {
            field = field.serialized_as(key);
        }
        if let Some(default) = &self.default {
            field = field.default_value(FieldValue::from_json(default.clone()));
        }
        Ok(field)
    }
}
