//! Tests for the fields module

use super::*;
use crate::fixtures;
use crate::hydrator::Hydrator;
use crate::schema::{FieldDef, FieldValue, Instance, ModelDef, WireType};
use crate::descriptor::Descriptor;
use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, FixedOffset};
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn object(value: JsonValue) -> JsonObject {
    value.as_object().cloned().unwrap()
}

fn jane() -> Instance {
    Instance::new("Simple")
        .with("id", "42")
        .with("firstname", "Jane")
        .with("lastname", "Doe")
        .with("int", 3_i64)
        .with("bool", true)
        .with("score", 2.5)
        .with(
            "datetime",
            DateTime::parse_from_rfc3339("2024-01-02T03:04:05+00:00").unwrap(),
        )
        .with(
            "date",
            DateTime::parse_from_rfc3339("2024-01-02T23:30:00+00:00").unwrap(),
        )
        .with("price", json!({"ht": 10.0, "ttc": 12.0, "vat": 20.0, "code": "EUR"}))
        .with("image", json!({"md5": "abc", "path": "/a.png"}))
}

// ============================================================================
// Getter Tests
// ============================================================================

#[test_case("firstname", json!("Jane") ; "string")]
#[test_case("email", json!("") ; "null string casts to empty")]
#[test_case("int", json!(3) ; "int")]
#[test_case("bool", json!(true) ; "bool")]
#[test_case("score", json!(2.5) ; "float")]
#[test_case("datetime", json!("2024-01-02 03:04:05") ; "datetime format")]
#[test_case("date", json!("2024-01-02") ; "date format")]
#[test_case("price", json!({"ht": 10.0, "ttc": 12.0, "vat": 20.0, "code": "EUR"}) ; "valid price")]
#[test_case("image", json!({"md5": "abc", "path": "/a.png"}) ; "image passthrough")]
#[test_case("tags", JsonValue::Null ; "untyped field")]
#[test_case("fullname", json!("Jane Doe") ; "computed reader")]
fn test_get(field: &str, expected: JsonValue) {
    let descriptor = fixtures::descriptor();
    let getter = Getter::new(&descriptor, utc());
    assert_eq!(getter.get("Simple", &jane(), field).unwrap(), expected);
}

#[test]
fn test_get_applies_timezone() {
    let descriptor = fixtures::descriptor();
    let paris = FixedOffset::east_opt(3600).unwrap();
    let getter = Getter::new(&descriptor, paris);
    assert_eq!(getter.get("Simple", &jane(), "date").unwrap(), json!("2024-01-03"));
    assert_eq!(
        getter.get("Simple", &jane(), "datetime").unwrap(),
        json!("2024-01-02 04:04:05")
    );
}

#[test]
fn test_get_invalid_price_is_null() {
    let descriptor = fixtures::descriptor();
    let getter = Getter::new(&descriptor, utc());
    let instance = Instance::new("Simple").with("price", json!({"ht": "ten"}));
    assert_eq!(getter.get("Simple", &instance, "price").unwrap(), JsonValue::Null);
}

#[test]
fn test_get_unknown_field_is_error() {
    let descriptor = fixtures::descriptor();
    let getter = Getter::new(&descriptor, utc());
    assert!(getter.get("Simple", &jane(), "ghost").unwrap_err().is_resolution());
}

#[test]
fn test_get_nested() {
    let descriptor = fixtures::descriptor();
    let getter = Getter::new(&descriptor, utc());
    let instance = jane().with("address", Instance::new("Address").with("city", "Lyon"));
    assert_eq!(getter.get("Simple", &instance, "address__city").unwrap(), json!("Lyon"));
    assert_eq!(getter.get("Simple", &jane(), "address__city").unwrap(), json!(""));
}

#[test]
fn test_getter_has() {
    let descriptor = fixtures::descriptor();
    let getter = Getter::new(&descriptor, utc());
    assert!(getter.has("Simple", "firstname"));
    assert!(getter.has("Simple", "address__city"));
    assert!(getter.has("Simple", "address__zip"));
    assert!(!getter.has("Simple", "secret"), "write-only");
    assert!(!getter.has("Simple", "id"), "excluded");
    assert!(!getter.has("Simple", "ghost"));
    assert!(!getter.has("Simple", "ghost__city"));
    assert!(!getter.has("Simple", "firstname__city"));
}

#[test]
fn test_exists() {
    let descriptor = fixtures::descriptor();
    let getter = Getter::new(&descriptor, utc());
    let instance = jane().with("email", "");
    assert!(getter.exists("Simple", &instance, "firstname").unwrap());
    assert!(!getter.exists("Simple", &instance, "email").unwrap());
    assert!(!getter.exists("Simple", &instance, "phone").unwrap());
}

#[test]
fn test_list_data() {
    let descriptor = fixtures::descriptor();
    let getter = Getter::new(&descriptor, utc());
    let instance = Instance::new("ListResource").with(
        "items",
        vec![
            Instance::new("ListItem").with("name", "a").with("int", 1_i64),
            Instance::new("ListItem").with("name", "b"),
        ],
    );
    assert_eq!(
        getter.list_data("ListResource", &instance, "items", "name").unwrap(),
        vec![json!("a"), json!("b")]
    );
    assert_eq!(
        getter.list_data("ListResource", &instance, "items", "int").unwrap(),
        vec![json!(1), json!(0)]
    );
    assert_eq!(
        getter.list_data("ListResource", &instance, "items", "ghost").unwrap(),
        vec![JsonValue::Null, JsonValue::Null]
    );
    let empty = Instance::new("ListResource");
    assert!(getter.list_data("ListResource", &empty, "items", "name").unwrap().is_empty());
}

#[test]
fn test_required_fields_collection() {
    let descriptor = fixtures::descriptor();
    let hydrator = Hydrator::new(descriptor.clone());
    let getter = Getter::new(&descriptor, utc());

    let missing = object(json!({"firstname": "Jane"}));
    assert!(getter.required_fields(&hydrator, "Simple", &missing).unwrap().is_none());

    let blank = object(json!({"firstname": "Jane", "lastname": "  "}));
    assert!(getter.required_fields(&hydrator, "Simple", &blank).unwrap().is_none());

    let complete = object(json!({"firstname": "Jane", "lastname": "Doe", "email": "x"}));
    let instance = getter
        .required_fields(&hydrator, "Simple", &complete)
        .unwrap()
        .unwrap();
    assert_eq!(instance.value("firstname"), Some(&FieldValue::from("Jane")));
    assert_eq!(instance.value("lastname"), Some(&FieldValue::from("Doe")));
    assert!(instance.value("email").is_none());
}

// ============================================================================
// Setter Tests
// ============================================================================

#[test]
fn test_set_writes_and_reports_change() {
    let descriptor = fixtures::descriptor();
    let setter = Setter::new(&descriptor, utc());
    let mut instance = jane();
    assert_eq!(
        setter.set("Simple", &mut instance, "firstname", &json!("Janet")).unwrap(),
        Some(true)
    );
    assert_eq!(instance.value("firstname"), Some(&FieldValue::from("Janet")));
    assert_eq!(
        setter.set("Simple", &mut instance, "int", &json!("12")).unwrap(),
        Some(true)
    );
    assert_eq!(instance.value("int"), Some(&FieldValue::from(12_i64)));
}

#[test_case("firstname", json!("Jane") ; "string")]
#[test_case("int", json!(3) ; "int")]
#[test_case("bool", json!(true) ; "bool")]
#[test_case("score", json!(2.5) ; "float")]
#[test_case("datetime", json!("2024-01-02 03:04:05") ; "datetime")]
#[test_case("date", json!("2024-01-02") ; "date at day granularity")]
#[test_case("email", json!(null) ; "null onto null")]
#[test_case("price", json!({"ht": "10", "ttc": 12, "vat": 20}) ; "equivalent price")]
#[test_case("image", json!({"md5": "abc", "path": "/b.png"}) ; "same checksum")]
fn test_set_same_value_is_noop(field: &str, value: JsonValue) {
    let descriptor = fixtures::descriptor();
    let setter = Setter::new(&descriptor, utc());
    let mut instance = jane();
    let before = instance.clone();
    assert_eq!(setter.set("Simple", &mut instance, field, &value).unwrap(), Some(false));
    assert_eq!(instance, before);
}

#[test]
fn test_set_current_value_round_trip() {
    let descriptor = fixtures::descriptor();
    let getter = Getter::new(&descriptor, utc());
    let setter = Setter::new(&descriptor, utc());
    let mut instance = jane();
    for field in ["firstname", "email", "int", "bool", "score", "date", "datetime", "price"] {
        let current = getter.get("Simple", &instance, field).unwrap();
        assert_eq!(
            setter.set("Simple", &mut instance, field, &current).unwrap(),
            Some(false),
            "field {field}"
        );
    }
}

#[test]
fn test_set_date_parses_in_timezone() {
    let descriptor = fixtures::descriptor();
    let paris = FixedOffset::east_opt(3600).unwrap();
    let setter = Setter::new(&descriptor, paris);
    let mut instance = Instance::new("Simple");
    assert_eq!(
        setter
            .set("Simple", &mut instance, "datetime", &json!("2024-05-01 10:00:00"))
            .unwrap(),
        Some(true)
    );
    assert_eq!(
        instance.value("datetime"),
        Some(&FieldValue::DateTime(
            DateTime::parse_from_rfc3339("2024-05-01T10:00:00+01:00").unwrap()
        ))
    );
}

#[test]
fn test_set_rejects_invalid_values() {
    let descriptor = fixtures::descriptor();
    let setter = Setter::new(&descriptor, utc());
    let mut instance = jane();
    let before = instance.clone();
    assert_eq!(setter.set("Simple", &mut instance, "date", &json!("soon")).unwrap(), None);
    assert_eq!(
        setter.set("Simple", &mut instance, "price", &json!({"ht": 1})).unwrap(),
        None
    );
    assert_eq!(setter.set("Simple", &mut instance, "tags", &json!(["a"])).unwrap(), None);
    assert_eq!(setter.set("Simple", &mut instance, "ghost", &json!("a")).unwrap(), None);
    assert_eq!(
        setter.set("Simple", &mut instance, "fullname", &json!("Someone Else")).unwrap(),
        None,
        "computed field has no storage"
    );
    assert_eq!(instance, before);
}

#[test]
fn test_set_stream_fails_closed() {
    let descriptor = Descriptor::from_models([
        ModelDef::new("Media").field(FieldDef::array("body").wire(WireType::Stream))
    ])
    .unwrap();
    let setter = Setter::new(&descriptor, utc());
    let mut instance = Instance::new("Media");
    assert_eq!(setter.set("Media", &mut instance, "body", &json!({"a": 1})).unwrap(), None);
    assert!(instance.value("body").is_none());
}

#[test]
fn test_set_uses_writer() {
    let descriptor = Descriptor::from_models([ModelDef::new("Upper").field(
        FieldDef::string("code").writer(|instance, value| {
            let upper = value
                .as_json()
                .and_then(JsonValue::as_str)
                .map(str::to_uppercase)
                .unwrap_or_default();
            instance.insert("code", upper);
        }),
    )])
    .unwrap();
    let setter = Setter::new(&descriptor, utc());
    let mut instance = Instance::new("Upper");
    assert_eq!(setter.set("Upper", &mut instance, "code", &json!("fr")).unwrap(), Some(true));
    assert_eq!(instance.value("code"), Some(&FieldValue::from("FR")));
}

#[test]
fn test_set_nested_creates_sub_resource() {
    let descriptor = fixtures::descriptor();
    let setter = Setter::new(&descriptor, utc());
    let getter = Getter::new(&descriptor, utc());
    let mut instance = Instance::new("Simple");

    assert_eq!(
        setter
            .set("Simple", &mut instance, "address__city", &json!("Paris"))
            .unwrap(),
        Some(true)
    );
    assert_eq!(getter.get("Simple", &instance, "address__city").unwrap(), json!("Paris"));
    assert_eq!(
        setter
            .set("Simple", &mut instance, "address__city", &json!("Paris"))
            .unwrap(),
        Some(false)
    );
}

#[test]
fn test_set_nested_noop_does_not_materialize() {
    let descriptor = fixtures::descriptor();
    let setter = Setter::new(&descriptor, utc());
    let mut instance = Instance::new("Simple");
    assert_eq!(
        setter.set("Simple", &mut instance, "address__city", &json!("")).unwrap(),
        Some(false)
    );
    assert!(instance.value("address").is_none());
}

#[test]
fn test_setter_has() {
    let descriptor = fixtures::descriptor();
    let setter = Setter::new(&descriptor, utc());
    assert!(setter.has("Simple", "firstname"));
    assert!(setter.has("Simple", "secret"));
    assert!(setter.has("Simple", "address__city"));
    assert!(!setter.has("Simple", "address__zip"), "read-only nested field");
    assert!(!setter.has("Simple", "image"), "read-only");
    assert!(!setter.has("Simple", "id"), "excluded");
    assert!(!setter.has("Simple", "ghost"));
}

#[test]
fn test_excluded_field_is_never_accessed() {
    let descriptor = fixtures::descriptor();
    let setter = Setter::new(&descriptor, utc());
    let getter = Getter::new(&descriptor, utc());
    let mut instance = jane();

    assert!(descriptor.is_excluded("Simple", "id"));
    assert_eq!(setter.set("Simple", &mut instance, "id", &json!("99")).unwrap(), None);
    assert_eq!(instance.value("id"), Some(&FieldValue::from("42")));
    assert_eq!(getter.get("Simple", &instance, "id").unwrap(), JsonValue::Null);

    let fields = object(json!({"id": "99", "firstname": "Janet"}));
    assert_eq!(setter.set_multi("Simple", &mut instance, &fields).unwrap(), None);
    assert_eq!(instance.value("id"), Some(&FieldValue::from("42")));
}

#[test]
fn test_set_unknown_nested_prefix() {
    let descriptor = fixtures::descriptor();
    let setter = Setter::new(&descriptor, utc());
    let mut instance = jane();

    assert_eq!(setter.set("Simple", &mut instance, "nope", &json!(1)).unwrap(), None);
    assert_eq!(setter.set("Simple", &mut instance, "nope__city", &json!(1)).unwrap(), None);
    assert_eq!(
        setter.set("Simple", &mut instance, "firstname__city", &json!(1)).unwrap(),
        None
    );
    assert_eq!(instance, jane());
}

#[test]
fn test_set_multi_aggregates() {
    let descriptor = fixtures::descriptor();
    let setter = Setter::new(&descriptor, utc());
    let mut instance = jane();

    let unchanged = object(json!({"firstname": "Jane", "int": 3}));
    assert_eq!(setter.set_multi("Simple", &mut instance, &unchanged).unwrap(), Some(false));

    let changed = object(json!({"firstname": "Jane", "int": 4}));
    assert_eq!(setter.set_multi("Simple", &mut instance, &changed).unwrap(), Some(true));

    let failing = object(json!({"date": "soon", "lastname": "Smith"}));
    assert_eq!(setter.set_multi("Simple", &mut instance, &failing).unwrap(), None);
    assert_eq!(instance.value("lastname"), Some(&FieldValue::from("Smith")));
}

#[test]
fn test_merge() {
    assert_eq!(merge(Some(false), Some(true)), Some(true));
    assert_eq!(merge(Some(false), Some(false)), Some(false));
    assert_eq!(merge(None, Some(true)), None);
    assert_eq!(merge(Some(true), None), None);
}

// ============================================================================
// List Write Tests
// ============================================================================

fn list_resource() -> Instance {
    Instance::new("ListResource").with(
        "items",
        vec![
            Instance::new("ListItem").with("name", "a").with("int", 1_i64),
            Instance::new("ListItem").with("name", "b").with("int", 2_i64),
            Instance::new("ListItem").with("name", "c").with("int", 3_i64),
        ],
    )
}

fn names(instance: &Instance) -> Vec<String> {
    instance
        .value("items")
        .and_then(FieldValue::as_list)
        .unwrap_or_default()
        .iter()
        .map(|item| {
            item.value("name")
                .and_then(FieldValue::as_json)
                .and_then(JsonValue::as_str)
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

#[test]
fn test_set_list_unchanged() {
    let descriptor = fixtures::descriptor();
    let setter = Setter::new(&descriptor, utc());
    let mut instance = list_resource();
    let items = vec![
        object(json!({"name": "a", "int": 1})),
        object(json!({"name": "b"})),
        object(json!({"name": "c"})),
    ];
    assert_eq!(
        setter.set_list_data("ListResource", &mut instance, "items", &items).unwrap(),
        Some(false)
    );
    assert_eq!(instance, list_resource());
}

#[test]
fn test_set_list_shrink() {
    let descriptor = fixtures::descriptor();
    let setter = Setter::new(&descriptor, utc());
    let mut instance = list_resource();
    let items = vec![object(json!({"name": "a"}))];
    assert_eq!(
        setter.set_list_data("ListResource", &mut instance, "items", &items).unwrap(),
        Some(true)
    );
    assert_eq!(names(&instance), vec!["a"]);
}

#[test]
fn test_set_list_grow_and_update() {
    let descriptor = fixtures::descriptor();
    let setter = Setter::new(&descriptor, utc());
    let mut instance = list_resource();
    let items = vec![
        object(json!({"name": "a"})),
        object(json!({"name": "B"})),
        object(json!({"name": "c"})),
        object(json!({"name": "d", "int": 4})),
    ];
    assert_eq!(
        setter.set_list_data("ListResource", &mut instance, "items", &items).unwrap(),
        Some(true)
    );
    assert_eq!(names(&instance), vec!["a", "B", "c", "d"]);
    let created = &instance.value("items").and_then(FieldValue::as_list).unwrap()[3];
    assert_eq!(created.value("bool"), Some(&FieldValue::from(false)));
}

#[test]
fn test_set_list_failure_leaves_list_untouched() {
    let descriptor = fixtures::descriptor();
    let setter = Setter::new(&descriptor, utc());
    let mut instance = list_resource();
    let items = vec![object(json!({"name": "z", "datetime": "whenever"}))];
    assert_eq!(
        setter.set_list_data("ListResource", &mut instance, "items", &items).unwrap(),
        None
    );
    assert_eq!(instance, list_resource());
}

#[test]
fn test_set_list_with_unknown_nested_key() {
    let descriptor = fixtures::descriptor();
    let setter = Setter::new(&descriptor, utc());
    let mut instance = list_resource();
    let items = vec![object(json!({"name": "a", "x__y": 1}))];
    assert_eq!(
        setter.set_list_data("ListResource", &mut instance, "items", &items).unwrap(),
        None
    );
    assert_eq!(instance, list_resource());
}

#[test]
fn test_set_list_on_empty_resource() {
    let descriptor = fixtures::descriptor();
    let setter = Setter::new(&descriptor, utc());
    let mut instance = Instance::new("ListResource");
    assert_eq!(
        setter.set_list_data("ListResource", &mut instance, "items", &[]).unwrap(),
        Some(false)
    );
    assert!(instance.value("items").is_none());
    assert!(setter
        .set_list_data("ListResource", &mut instance, "name", &[])
        .is_err());
}
