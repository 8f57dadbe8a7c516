//! Tests for the schema module

use super::*;
use crate::types::SyncPreference;
use chrono::DateTime;
use serde_json::json;

#[test]
fn test_wire_type_families() {
    assert!(WireType::Email.is_text());
    assert!(WireType::State.is_text());
    assert!(!WireType::Price.is_text());
    assert!(WireType::Date.is_temporal());
    assert!(WireType::Image.is_binary());
    assert!(!WireType::Bool.is_binary());
}

#[test]
fn test_wire_type_serde() {
    let wire: WireType = serde_json::from_str("\"datetime\"").unwrap();
    assert_eq!(wire, WireType::DateTime);
    assert_eq!(serde_json::to_string(&WireType::Country).unwrap(), "\"country\"");
    assert_eq!(WireType::Currency.to_string(), "currency");
}

#[test]
fn test_native_type_inference() {
    assert_eq!(NativeType::String.inferred_wire_type(), Some(WireType::String));
    assert_eq!(NativeType::Float.inferred_wire_type(), Some(WireType::Float));
    assert_eq!(NativeType::DateTime.inferred_wire_type(), Some(WireType::DateTime));
    assert_eq!(NativeType::Array.inferred_wire_type(), None);
    assert_eq!(
        NativeType::Object("Address".into()).inferred_wire_type(),
        None
    );
}

#[test]
fn test_field_value_from_json_null() {
    assert!(FieldValue::from_json(json!(null)).is_null());
    assert_eq!(FieldValue::from("a").as_json(), Some(&json!("a")));
    assert!(FieldValue::from(f64::NAN).is_null());
}

#[test]
fn test_instance_builder() {
    let date = DateTime::parse_from_rfc3339("2024-01-02T03:04:05+00:00").unwrap();
    let instance = Instance::new("Simple")
        .with("firstname", "Jane")
        .with("int", 3_i64)
        .with("date", date)
        .with("address", Instance::new("Address").with("city", "Paris"));

    assert_eq!(instance.model(), "Simple");
    assert_eq!(instance.value("firstname"), Some(&FieldValue::from("Jane")));
    assert_eq!(instance.value("date"), Some(&FieldValue::DateTime(date)));
    assert_eq!(
        instance
            .value("address")
            .and_then(FieldValue::as_object)
            .and_then(|a| a.value("city")),
        Some(&FieldValue::from("Paris"))
    );
    assert!(instance.value("missing").is_none());
}

#[test]
fn test_field_def_builder() {
    let field = FieldDef::string("countryId")
        .wire(WireType::Country)
        .groups([Group::Read, Group::Write])
        .groups([Group::List])
        .serialized_as("country_id")
        .label("Address")
        .choice("FR", "France")
        .microdata("http://schema.org/PostalAddress", "addressCountry")
        .prefer(SyncPreference::Write);

    assert_eq!(field.name(), "countryId");
    assert_eq!(field.serialized_name(), "country_id");
    assert_eq!(field.forced_wire(), Some(WireType::Country));
    assert!(field.has_group(Group::List));
    assert!(field.has_group(Group::Write));
    assert!(!field.has_group(Group::Required));
    assert_eq!(field.ui_label(), Some("Address"));
    assert_eq!(field.choices().len(), 1);
    assert_eq!(field.preference(), Some(SyncPreference::Write));
    assert!(field.has_storage());
}

#[test]
fn test_computed_field_has_no_storage() {
    let field = FieldDef::string("fullname").computed(|i| {
        i.value("firstname").cloned().unwrap_or_default()
    });
    assert!(!field.has_storage());
    assert!(field.read_fn().is_some());
    assert!(field.write_fn().is_none());
}

#[test]
fn test_model_def_exclusions() {
    let model = ModelDef::new("Simple")
        .field(FieldDef::string("id"))
        .field(FieldDef::string("name"));
    assert!(model.exclusions().is_none());
    assert_eq!(model.fields().len(), 2);

    let model = model.exclude(["name"]);
    assert_eq!(model.exclusions(), Some(&["name".to_string()][..]));
}
