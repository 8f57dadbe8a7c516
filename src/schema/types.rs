//! Schema value types
//!
//! Wire types, field groups, and the dynamic instance records the whole
//! crate reads and writes.

use crate::types::JsonValue;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Wire Type
// ============================================================================

/// Semantic type of a field, independent of how it is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireType {
    String,
    Bool,
    Int,
    Float,
    DateTime,
    Date,
    Price,
    Image,
    File,
    Stream,
    Url,
    Email,
    Phone,
    Lang,
    Country,
    Currency,
    Inline,
    State,
}

impl WireType {
    /// Types read and written as plain text
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            WireType::String
                | WireType::Url
                | WireType::Email
                | WireType::Phone
                | WireType::Lang
                | WireType::Country
                | WireType::Currency
                | WireType::Inline
                | WireType::State
        )
    }

    /// Types carrying a calendar value
    pub fn is_temporal(&self) -> bool {
        matches!(self, WireType::Date | WireType::DateTime)
    }

    /// Types passed through as raw structured data
    pub fn is_binary(&self) -> bool {
        matches!(self, WireType::File | WireType::Image | WireType::Stream)
    }

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            WireType::String => "string",
            WireType::Bool => "bool",
            WireType::Int => "int",
            WireType::Float => "float",
            WireType::DateTime => "datetime",
            WireType::Date => "date",
            WireType::Price => "price",
            WireType::Image => "image",
            WireType::File => "file",
            WireType::Stream => "stream",
            WireType::Url => "url",
            WireType::Email => "email",
            WireType::Phone => "phone",
            WireType::Lang => "lang",
            WireType::Country => "country",
            WireType::Currency => "currency",
            WireType::Inline => "inline",
            WireType::State => "state",
        }
    }
}

impl std::fmt::Display for WireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Native Type
// ============================================================================

/// Declared storage type of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeType {
    String,
    Bool,
    Int,
    Float,
    DateTime,
    /// Untyped structured data (maps, arrays)
    Array,
    /// A single nested record of the named model
    Object(String),
    /// A collection of records; `None` when no item type is declared
    Iterable(Option<String>),
}

impl NativeType {
    /// Wire type inferred from the storage type alone
    pub fn inferred_wire_type(&self) -> Option<WireType> {
        match self {
            NativeType::String => Some(WireType::String),
            NativeType::Bool => Some(WireType::Bool),
            NativeType::Int => Some(WireType::Int),
            NativeType::Float => Some(WireType::Float),
            NativeType::DateTime => Some(WireType::DateTime),
            NativeType::Array | NativeType::Object(_) | NativeType::Iterable(_) => None,
        }
    }
}

// ============================================================================
// Groups
// ============================================================================

/// Field group membership, drives visibility and flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Group {
    Read,
    Write,
    Required,
    List,
    Log,
    NoTest,
}

/// Extraction view applied by the hydrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Fields without explicit groups plus the `Write` group
    Write,
    /// `Required` group only
    Required,
    /// `List` group only
    List,
}

// ============================================================================
// Field Value
// ============================================================================

/// Value held by one field of an instance
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Null,
    /// Scalars and raw structures (prices, files, images)
    Value(JsonValue),
    DateTime(DateTime<FixedOffset>),
    Object(Box<Instance>),
    List(Vec<Instance>),
}

impl FieldValue {
    /// Wrap a JSON value, mapping JSON null to `Null`
    pub fn from_json(value: JsonValue) -> Self {
        if value.is_null() {
            Self::Null
        } else {
            Self::Value(value)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the JSON payload of a scalar value
    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            Self::Object(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Instance]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<JsonValue> for FieldValue {
    fn from(value: JsonValue) -> Self {
        Self::from_json(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Value(JsonValue::String(value.to_string()))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Value(JsonValue::String(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Value(JsonValue::Bool(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Value(JsonValue::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::from_json(JsonValue::from(value))
    }
}

impl From<DateTime<FixedOffset>> for FieldValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::DateTime(value)
    }
}

impl From<Instance> for FieldValue {
    fn from(value: Instance) -> Self {
        Self::Object(Box::new(value))
    }
}

impl From<Vec<Instance>> for FieldValue {
    fn from(value: Vec<Instance>) -> Self {
        Self::List(value)
    }
}

// ============================================================================
// Instance
// ============================================================================

/// In-memory record of one remote resource
///
/// Fields that were never set read as `Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    model: String,
    values: BTreeMap<String, FieldValue>,
}

impl Instance {
    /// Create an empty instance of a model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            values: BTreeMap::new(),
        }
    }

    /// Builder-style field assignment
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Name of the model this instance belongs to
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Stored value of a field
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Mutable stored value of a field
    pub fn value_mut(&mut self, field: &str) -> Option<&mut FieldValue> {
        self.values.get_mut(field)
    }

    /// Store a field value
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(field.into(), value.into());
    }

    /// Remove a field value
    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.values.remove(field)
    }

    /// Iterate over stored values
    pub fn values(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.values.iter()
    }
}
