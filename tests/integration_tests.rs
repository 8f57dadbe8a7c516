//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: YAML configuration → connector →
//! adapter calls → HTTP requests → hydrated objects.

use openapi_connector::action::ListParams;
use openapi_connector::template::TemplateContext;
use openapi_connector::{Connector, ConnectorConfig};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use wiremock::matchers::{any, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SCHEMA: &str = r#"
schema:
  - name: Simple
    fields:
      - { name: id, type: string, groups: [Read, Write, List] }
      - { name: firstname, type: string, groups: [Read, Write, List, Required] }
      - { name: lastname, type: string, groups: [Read, Write, List, Required] }
      - { name: email, type: string, wire: email }
      - { name: birthday, type: datetime, wire: date }
      - { name: address, type: object, target: Address }
  - name: Address
    fields:
      - { name: city, type: string }
"#;

fn connector(host: &str, extra: &str) -> Connector {
    let yaml = format!("host: {host}\napi_key: \"{{{{ env.TOKEN }}}}\"\n{extra}\n{SCHEMA}");
    let ctx = TemplateContext::new().with_env(json!({"TOKEN": "secret"}));
    let config = ConnectorConfig::from_str_with(&yaml, &ctx).unwrap();
    Connector::new(config, Vec::new()).unwrap()
}

fn inputs(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn rows(from: usize, to: usize) -> Value {
    Value::Array(
        (from..to)
            .map(|i| json!({"id": i.to_string(), "firstname": "F", "lastname": "L"}))
            .collect(),
    )
}

// ============================================================================
// CRUD Scenario Tests
// ============================================================================

#[tokio::test]
async fn test_create_scenario() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/simples"))
        .and(header("api-key", "secret"))
        .and(body_json(json!({"firstname": "Jane", "lastname": "Doe"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "42", "firstname": "Jane", "lastname": "Doe",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut connector = connector(&server.uri(), "");
    let object = connector.object_mut("Simple").unwrap();

    let created = object
        .create(&inputs(json!({"firstname": "Jane", "lastname": "Doe"})))
        .await
        .unwrap()
        .unwrap();
    object.set_object(created);

    assert_eq!(object.object_identifier().as_deref(), Some("42"));
    assert_eq!(
        object.get_simple_field("firstname").unwrap(),
        Some(json!("Jane"))
    );
}

#[tokio::test]
async fn test_required_field_gate() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let connector = connector(&server.uri(), "");
    let created = connector
        .object("Simple")
        .unwrap()
        .create(&inputs(json!({"firstname": "Jane"})))
        .await
        .unwrap();

    assert!(created.is_none());
}

#[tokio::test]
async fn test_load_update_cycle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simples/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "7",
            "firstname": "Jane",
            "lastname": "Doe",
            "birthday": "1990-05-17T00:00:00+00:00",
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/simples/7"))
        .and(header("content-type", "application/merge-patch+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "7"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut connector = connector(&server.uri(), "timezone: \"+02:00\"");
    let object = connector.object_mut("Simple").unwrap();
    let loaded = object.load("7").await.unwrap().unwrap();
    object.set_object(loaded);

    assert_eq!(
        object.get_simple_field("birthday").unwrap(),
        Some(json!("1990-05-17"))
    );

    let remaining = object
        .set_fields(&inputs(json!({
            "firstname": "Jane",
            "address__city": "Paris",
            "unknown": true,
        })))
        .unwrap();
    assert_eq!(remaining, inputs(json!({"unknown": true})));
    assert!(object.tracker().is_needed());

    assert_eq!(object.update(true).await.unwrap().as_deref(), Some("7"));

    let requests = server.received_requests().await.unwrap();
    let patch = requests
        .iter()
        .find(|request| request.method.as_str() == "PATCH")
        .unwrap();
    let body: Value = serde_json::from_slice(&patch.body).unwrap();
    assert_eq!(body["address"], json!({"city": "Paris"}));
    assert_eq!(body["firstname"], json!("Jane"));
}

#[tokio::test]
async fn test_delete_unknown_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "gone"})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let connector = connector(&server.uri(), "");
    let object = connector.object("Simple").unwrap();
    assert!(!object.delete(Some("9")).await.unwrap());

    let last = object.visitor().last_response().unwrap();
    assert_eq!(last.status, Some(404));
}

// ============================================================================
// List Tests
// ============================================================================

#[tokio::test]
async fn test_pagination_by_offset() {
    let server = MockServer::start().await;
    for (offset, to) in [(0, 50), (50, 100), (100, 120)] {
        Mock::given(method("GET"))
            .and(path("/simples"))
            .and(query_param("offset", offset.to_string()))
            .and(query_param("limit", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_embedded": {"simples": rows(offset, to)},
                "total": 120,
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let connector = connector(&server.uri(), "dialect: json_hal\nlist:\n  offsetKey: offset");
    let response = connector
        .object("Simple")
        .unwrap()
        .visitor()
        .list_with_pagination(None, 50, 1000)
        .await
        .unwrap();

    assert!(response.is_success());
    assert_eq!(response.list_count(), 120);
    assert_eq!(response.list_total(), 120);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_hal_totals() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simples"))
        .and(query_param("q", "with-total"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": {"items": rows(0, 2)},
            "totalItems": 42,
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/simples"))
        .and(query_param("q", "without-total"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": {"items": rows(0, 2)},
        })))
        .mount(&server)
        .await;

    let connector = connector(&server.uri(), "dialect: json_hal\nlist:\n  filterKey: q");
    let visitor = connector.object("Simple").unwrap().visitor();

    let response = visitor.list(Some("with-total"), None).await.unwrap();
    assert_eq!(response.list_total(), 42);
    assert_eq!(response.list_count(), 2);

    let response = visitor.list(Some("without-total"), None).await.unwrap();
    assert_eq!(response.list_total(), 0);
}

#[tokio::test]
async fn test_objects_list_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simples"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows(10, 12)))
        .mount(&server)
        .await;

    let connector = connector(&server.uri(), "");
    let visitor = connector.object("Simple").unwrap().visitor();
    let response = visitor
        .list(None, Some(&ListParams::page(10, 10)))
        .await
        .unwrap();

    let payload = response.payload();
    assert_eq!(payload["items"][0]["id"], json!("10"));
    assert_eq!(payload["meta"]["current"], json!(2));
}

// ============================================================================
// Failure Propagation Tests
// ============================================================================

#[tokio::test]
async fn test_transport_failure() {
    let connector = connector("http://127.0.0.1:1", "");
    let visitor = connector.object("Simple").unwrap().visitor();

    assert!(!visitor.list(None, None).await.unwrap().is_success());
    assert!(!visitor.load("1").await.unwrap().is_success());
    assert!(!visitor.delete("1".into()).await.unwrap().is_success());

    let last = visitor.last_response().unwrap();
    assert_eq!(last.status, None);
    assert!(last.error.is_some());

    let ping = connector.ping().await;
    assert!(!ping.success);
}

#[tokio::test]
async fn test_server_error_is_failure() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let connector = connector(&server.uri(), "");
    let object = connector.object("Simple").unwrap();
    assert!(object.load("1").await.unwrap().is_none());

    let created = object
        .create(&inputs(json!({"firstname": "Jane", "lastname": "Doe"})))
        .await
        .unwrap();
    assert!(created.is_none());
}
