//! Framework field declarations
//!
//! Walks a model's field table and emits one [`FieldSpec`] per field the
//! sync framework can read or write. Sub-resource fields are flattened to
//! `prefix__field`, list-resource item fields to `field@list`.

use super::address::{list_id, nested_id};
use super::registry::{field_is_read_only, field_is_write_only, Descriptor};
use crate::error::Result;
use crate::schema::{FieldDef, Group, WireType};
use crate::types::SyncPreference;
use serde::Serialize;

/// Field declaration exposed to the sync framework
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub wire_type: WireType,
    pub required: bool,
    pub read_only: bool,
    pub write_only: bool,
    pub listed: bool,
    pub logged: bool,
    pub not_tested: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_list: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub microdata: Option<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefer: Option<SyncPreference>,
}

/// Where a field sits relative to the root model
#[derive(Clone, Copy)]
enum Placement<'a> {
    Root,
    SubResource(&'a str),
    ListItem(&'a str),
}

/// Build the framework declarations of a model
///
/// Excluded fields and fields without a resolvable wire type are skipped.
/// Relations are expanded one level deep only.
pub fn build_fields(descriptor: &Descriptor, model: &str) -> Result<Vec<FieldSpec>> {
    let mut specs = Vec::new();
    for field in descriptor.model(model)?.fields() {
        add_field(descriptor, model, field, Placement::Root, &mut specs)?;
    }
    tracing::debug!(model, fields = specs.len(), "Built field declarations");
    Ok(specs)
}

fn add_field(
    descriptor: &Descriptor,
    owner: &str,
    field: &FieldDef,
    placement: Placement<'_>,
    specs: &mut Vec<FieldSpec>,
) -> Result<()> {
    if descriptor.is_excluded(owner, field.name()) {
        return Ok(());
    }

    if let Placement::Root = placement {
        if let Some(prefix) = descriptor.is_sub_resource(owner, field.name())? {
            let target = descriptor.sub_resource_model(owner, prefix)?;
            return add_children(descriptor, field, target, Placement::SubResource(prefix), specs);
        }
        if let Some(list) = descriptor.is_list_resource(owner, field.name())? {
            let item = descriptor.list_resource_model(owner, list)?;
            return add_children(descriptor, field, item, Placement::ListItem(list), specs);
        }
    }

    let Some(wire_type) = field
        .forced_wire()
        .or_else(|| field.native().inferred_wire_type())
    else {
        return Ok(());
    };

    let (id, group, in_list) = match placement {
        Placement::Root => (field.name().to_string(), None, None),
        Placement::SubResource(prefix) => (
            nested_id(prefix, field.name()),
            Some(capitalize(prefix)),
            None,
        ),
        Placement::ListItem(list) => (
            list_id(list, field.name()),
            None,
            Some(list.to_string()),
        ),
    };

    specs.push(FieldSpec {
        id,
        name: capitalize(field.name()),
        wire_type,
        required: field.has_group(Group::Required),
        read_only: field_is_read_only(field),
        write_only: field_is_write_only(field),
        listed: matches!(placement, Placement::Root) && field.has_group(Group::List),
        logged: field.has_group(Group::Log),
        not_tested: field.has_group(Group::NoTest),
        group: field.ui_label().map(str::to_string).or(group),
        in_list,
        description: field.description().map(str::to_string),
        choices: field.choices().to_vec(),
        microdata: field.microdata_ref().cloned(),
        prefer: field.preference(),
    });
    Ok(())
}

/// Expand the fields of a relation target; a read-only parent makes every
/// child read-only
fn add_children(
    descriptor: &Descriptor,
    parent: &FieldDef,
    target: &str,
    placement: Placement<'_>,
    specs: &mut Vec<FieldSpec>,
) -> Result<()> {
    let parent_read_only = field_is_read_only(parent);
    for child in descriptor.model(target)?.fields() {
        let child = if parent_read_only {
            child.as_read_only()
        } else {
            child.clone()
        };
        add_field(descriptor, target, &child, placement, specs)?;
    }
    Ok(())
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
