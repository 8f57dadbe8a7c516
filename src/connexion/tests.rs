//! Tests for the connexion module

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn connexion(server: &MockServer) -> HttpConnexion {
    HttpConnexion::new(HttpConnexionConfig::builder().endpoint(server.uri()).build()).unwrap()
}

#[test]
fn test_config_default() {
    let config = HttpConnexionConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.accept, "application/json");
    assert_eq!(config.patch_mime, "application/merge-patch+json");
    assert!(config.headers.is_empty());
}

#[test]
fn test_config_builder() {
    let config = HttpConnexionConfig::builder()
        .endpoint("https://api.example.com")
        .timeout(Duration::from_secs(5))
        .header("api-key", "secret")
        .dialect(crate::types::Dialect::JsonHal)
        .patch_mime("application/json")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.endpoint, "https://api.example.com");
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.headers.get("api-key"), Some(&"secret".to_string()));
    assert_eq!(config.accept, "application/hal+json");
    assert_eq!(config.patch_mime, "application/json");
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_invalid_endpoint() {
    let config = HttpConnexionConfig::builder().endpoint("not a url").build();
    assert!(HttpConnexion::new(config).is_err());
}

#[test]
fn test_last_response_success() {
    let mut last = LastResponse::default();
    assert!(!last.is_success());
    last.status = Some(204);
    assert!(last.is_success());
    last.status = Some(404);
    assert!(!last.is_success());
}

#[tokio::test]
async fn test_get_with_query_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simples"))
        .and(query_param("limit", "10"))
        .and(header("api-key", "secret"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "1"}])))
        .expect(1)
        .mount(&server)
        .await;

    let connexion = HttpConnexion::new(
        HttpConnexionConfig::builder()
            .endpoint(server.uri())
            .header("api-key", "secret")
            .build(),
    )
    .unwrap();
    let query = QueryParams::from([("limit".to_string(), "10".to_string())]);

    let body = connexion.get("/simples", &query).await;
    assert_eq!(body, Some(json!([{"id": "1"}])));

    let last = connexion.last_response().unwrap();
    assert_eq!(last.method, Method::GET);
    assert_eq!(last.status, Some(200));
    assert!(last.url.contains("/simples?limit=10"));
}

#[tokio::test]
async fn test_empty_body_decodes_to_object() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/simples/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let connexion = connexion(&server);
    assert_eq!(connexion.delete("/simples/1").await, Some(json!({})));
}

#[tokio::test]
async fn test_error_status_returns_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simples/9"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"error": "not found", "code": 404}))
                .insert_header("x-trace", "abc"),
        )
        .mount(&server)
        .await;

    let connexion = connexion(&server);
    assert_eq!(connexion.get("/simples/9", &QueryParams::new()).await, None);

    let last = connexion.last_response().unwrap();
    assert_eq!(last.status, Some(404));
    assert!(!last.is_success());
    assert!(last.body.unwrap().contains("not found"));
    assert!(last.headers.iter().any(|(key, value)| key == "x-trace" && value == "abc"));
}

#[tokio::test]
async fn test_transport_failure_returns_none() {
    let connexion =
        HttpConnexion::new(HttpConnexionConfig::builder().endpoint("http://127.0.0.1:1").build())
            .unwrap();
    assert_eq!(connexion.get("/simples", &QueryParams::new()).await, None);

    let last = connexion.last_response().unwrap();
    assert_eq!(last.status, None);
    assert!(last.error.is_some());
}

#[tokio::test]
async fn test_post_and_put_send_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/simples"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"firstname": "Jane"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "42"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/simples/42"))
        .and(body_json(json!({"lastname": "Doe"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "42"})))
        .expect(1)
        .mount(&server)
        .await;

    let connexion = connexion(&server);
    assert_eq!(
        connexion.post("/simples", &json!({"firstname": "Jane"})).await,
        Some(json!({"id": "42"}))
    );
    assert_eq!(
        connexion.put("simples/42", &json!({"lastname": "Doe"})).await,
        Some(json!({"id": "42"}))
    );
}

#[tokio::test]
async fn test_patch_uses_merge_patch_mime() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/simples/42"))
        .and(header("content-type", "application/merge-patch+json"))
        .and(body_string("null"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&server)
        .await;

    let connexion = connexion(&server);
    assert_eq!(connexion.patch("/simples/42", None).await, Some(json!({})));
}

#[tokio::test]
async fn test_hal_dialect_accept_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("accept", "application/hal+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_embedded": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let connexion = HttpConnexion::new(
        HttpConnexionConfig::builder()
            .endpoint(server.uri())
            .dialect(crate::types::Dialect::JsonHal)
            .build(),
    )
    .unwrap();
    assert!(connexion.get("", &QueryParams::new()).await.is_some());
}

#[tokio::test]
async fn test_get_raw() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/readme.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
        .mount(&server)
        .await;

    let connexion = HttpConnexion::new(
        HttpConnexionConfig::builder()
            .endpoint(format!("{}/api", server.uri()))
            .build(),
    )
    .unwrap();
    let absolute = format!("{}/files/readme.txt", server.uri());
    assert_eq!(
        connexion.get_raw(&absolute, &QueryParams::new(), true).await,
        Some("plain text".to_string())
    );
    assert_eq!(
        connexion.get_raw("/files/readme.txt", &QueryParams::new(), false).await,
        None,
        "relative path resolves under the endpoint"
    );
}
