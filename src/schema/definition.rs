//! Declarative model and field definitions
//!
//! A model is declared once as a table of [`FieldDef`]s. Everything else in
//! the crate (descriptor, accessors, hydrator, field builder) reads this
//! table instead of inspecting types at runtime.

use super::types::{FieldValue, Group, Instance, NativeType, WireType};
use crate::types::SyncPreference;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Reader closure: takes precedence over stored data
pub type ReadFn = Arc<dyn Fn(&Instance) -> FieldValue + Send + Sync>;

/// Writer closure: takes precedence over direct storage
pub type WriteFn = Arc<dyn Fn(&mut Instance, FieldValue) + Send + Sync>;

// ============================================================================
// Field Definition
// ============================================================================

/// One declared field of a model
#[derive(Clone)]
pub struct FieldDef {
    name: String,
    serialized_name: Option<String>,
    native: NativeType,
    wire: Option<WireType>,
    groups: Option<BTreeSet<Group>>,
    read_only: bool,
    label: Option<String>,
    description: Option<String>,
    choices: Vec<(String, String)>,
    microdata: Option<(String, String)>,
    prefer: Option<SyncPreference>,
    default: FieldValue,
    storage: bool,
    reader: Option<ReadFn>,
    writer: Option<WriteFn>,
}

impl FieldDef {
    /// Create a field with an explicit native type
    pub fn new(name: impl Into<String>, native: NativeType) -> Self {
        Self {
            name: name.into(),
            serialized_name: None,
            native,
            wire: None,
            groups: None,
            read_only: false,
            label: None,
            description: None,
            choices: Vec::new(),
            microdata: None,
            prefer: None,
            default: FieldValue::Null,
            storage: true,
            reader: None,
            writer: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, NativeType::String)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, NativeType::Bool)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, NativeType::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, NativeType::Float)
    }

    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, NativeType::DateTime)
    }

    /// Untyped structured data, usually paired with a forced wire type
    pub fn array(name: impl Into<String>) -> Self {
        Self::new(name, NativeType::Array)
    }

    /// Nested record of another model
    pub fn object(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, NativeType::Object(target.into()))
    }

    /// Collection of records of another model
    pub fn list(name: impl Into<String>, item: impl Into<String>) -> Self {
        Self::new(name, NativeType::Iterable(Some(item.into())))
    }

    /// Collection without a declared item type
    pub fn iterable(name: impl Into<String>) -> Self {
        Self::new(name, NativeType::Iterable(None))
    }

    // ------------------------------------------------------------------------
    // Builder methods
    // ------------------------------------------------------------------------

    /// Force the wire type, overriding inference from the native type
    #[must_use]
    pub fn wire(mut self, wire: WireType) -> Self {
        self.wire = Some(wire);
        self
    }

    /// Declare group membership
    #[must_use]
    pub fn groups(mut self, groups: impl IntoIterator<Item = Group>) -> Self {
        self.groups
            .get_or_insert_with(BTreeSet::new)
            .extend(groups);
        self
    }

    /// Mark as read-only regardless of groups
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// UI group label
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add an allowed value
    #[must_use]
    pub fn choice(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.choices.push((value.into(), label.into()));
        self
    }

    /// Schema.org style item type and property
    #[must_use]
    pub fn microdata(mut self, item_type: impl Into<String>, item_prop: impl Into<String>) -> Self {
        self.microdata = Some((item_type.into(), item_prop.into()));
        self
    }

    #[must_use]
    pub fn prefer(mut self, prefer: SyncPreference) -> Self {
        self.prefer = Some(prefer);
        self
    }

    /// Key used on the wire when different from the field id
    #[must_use]
    pub fn serialized_as(mut self, key: impl Into<String>) -> Self {
        self.serialized_name = Some(key.into());
        self
    }

    /// Value of the field on a freshly constructed instance
    #[must_use]
    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = value.into();
        self
    }

    /// Reader used instead of the stored value
    #[must_use]
    pub fn reader<F>(mut self, reader: F) -> Self
    where
        F: Fn(&Instance) -> FieldValue + Send + Sync + 'static,
    {
        self.reader = Some(Arc::new(reader));
        self
    }

    /// Writer used instead of direct storage
    #[must_use]
    pub fn writer<F>(mut self, writer: F) -> Self
    where
        F: Fn(&mut Instance, FieldValue) + Send + Sync + 'static,
    {
        self.writer = Some(Arc::new(writer));
        self
    }

    /// Readable field with no storage of its own
    #[must_use]
    pub fn computed<F>(self, reader: F) -> Self
    where
        F: Fn(&Instance) -> FieldValue + Send + Sync + 'static,
    {
        let mut field = self.reader(reader);
        field.storage = false;
        field
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key used on the wire
    pub fn serialized_name(&self) -> &str {
        self.serialized_name.as_deref().unwrap_or(&self.name)
    }

    pub fn native(&self) -> &NativeType {
        &self.native
    }

    pub fn forced_wire(&self) -> Option<WireType> {
        self.wire
    }

    pub fn declared_groups(&self) -> Option<&BTreeSet<Group>> {
        self.groups.as_ref()
    }

    pub fn has_group(&self, group: Group) -> bool {
        self.groups.as_ref().is_some_and(|g| g.contains(&group))
    }

    /// Explicit read-only flag
    pub fn is_flagged_read_only(&self) -> bool {
        self.read_only
    }

    pub fn ui_label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn choices(&self) -> &[(String, String)] {
        &self.choices
    }

    pub fn microdata_ref(&self) -> Option<&(String, String)> {
        self.microdata.as_ref()
    }

    pub fn preference(&self) -> Option<SyncPreference> {
        self.prefer
    }

    /// Value held by a freshly constructed instance
    pub fn initial_value(&self) -> &FieldValue {
        &self.default
    }

    pub fn has_storage(&self) -> bool {
        self.storage
    }

    pub fn read_fn(&self) -> Option<&ReadFn> {
        self.reader.as_ref()
    }

    pub fn write_fn(&self) -> Option<&WriteFn> {
        self.writer.as_ref()
    }

    /// Copy of this field with the read-only flag set
    pub(crate) fn as_read_only(&self) -> Self {
        let mut field = self.clone();
        field.read_only = true;
        field
    }
}

impl std::fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("native", &self.native)
            .field("wire", &self.wire)
            .field("groups", &self.groups)
            .field("read_only", &self.read_only)
            .field("storage", &self.storage)
            .field("has_reader", &self.reader.is_some())
            .field("has_writer", &self.writer.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Model Definition
// ============================================================================

/// Declared model: a name plus its field table
#[derive(Debug, Clone)]
pub struct ModelDef {
    name: String,
    fields: Vec<FieldDef>,
    exclude: Option<Vec<String>>,
}

impl ModelDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            exclude: None,
        }
    }

    /// Append a field
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Override the default exclusion list (`id`)
    #[must_use]
    pub fn exclude<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn exclusions(&self) -> Option<&[String]> {
        self.exclude.as_deref()
    }

    pub(crate) fn set_exclusions(&mut self, fields: Vec<String>) {
        self.exclude = Some(fields);
    }
}
