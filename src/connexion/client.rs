//! HTTP connexion on top of `reqwest`
//!
//! One request per call, no retries. Responses are read as text so that
//! failures can be logged verbatim before the body is decoded.

use super::errors::log_failure;
use super::{Connexion, LastResponse, DEFAULT_TIMEOUT_SECS, MERGE_PATCH_MIME};
use crate::error::Result;
use crate::types::{Dialect, JsonObject, JsonValue, Method, QueryParams};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, error, warn};

const JSON_MIME: &str = "application/json";
const TEXT_MIME: &str = "text/plain";

/// Configuration for the HTTP connexion
#[derive(Debug, Clone)]
pub struct HttpConnexionConfig {
    /// Base URL every path is appended to
    pub endpoint: String,
    pub timeout: Duration,
    /// Static headers sent with every request
    pub headers: BTreeMap<String, String>,
    /// MIME type expected in responses
    pub accept: String,
    /// MIME type of PATCH bodies
    pub patch_mime: String,
    pub user_agent: String,
}

impl Default for HttpConnexionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            headers: BTreeMap::new(),
            accept: Dialect::Json.accept_mime().to_string(),
            patch_mime: MERGE_PATCH_MIME.to_string(),
            user_agent: format!("openapi-connector/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConnexionConfig {
    /// Create a new config builder
    pub fn builder() -> HttpConnexionConfigBuilder {
        HttpConnexionConfigBuilder::default()
    }
}

/// Builder for HTTP connexion config
#[derive(Debug, Default)]
pub struct HttpConnexionConfigBuilder {
    config: HttpConnexionConfig,
}

impl HttpConnexionConfigBuilder {
    #[must_use]
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a static header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(key.into(), value.into());
        self
    }

    /// Expect the response MIME type of a dialect
    #[must_use]
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.config.accept = dialect.accept_mime().to_string();
        self
    }

    /// Override the expected response MIME type
    #[must_use]
    pub fn accept(mut self, mime: impl Into<String>) -> Self {
        self.config.accept = mime.into();
        self
    }

    #[must_use]
    pub fn patch_mime(mut self, mime: impl Into<String>) -> Self {
        self.config.patch_mime = mime.into();
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    pub fn build(self) -> HttpConnexionConfig {
        self.config
    }
}

/// One outgoing request
struct Outgoing<'a> {
    method: Method,
    url: String,
    query: &'a QueryParams,
    accept: &'a str,
    body: Option<(String, &'a str)>,
}

/// `Connexion` speaking JSON over HTTP
pub struct HttpConnexion {
    client: Client,
    config: HttpConnexionConfig,
    last: Mutex<Option<LastResponse>>,
}

impl HttpConnexion {
    /// Create a connexion; fails on an invalid endpoint
    pub fn new(config: HttpConnexionConfig) -> Result<Self> {
        url::Url::parse(&config.endpoint)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self {
            client,
            config,
            last: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &HttpConnexionConfig {
        &self.config
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.is_empty() {
            return self.config.endpoint.clone();
        }
        let base = self.config.endpoint.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    fn record(&self, last: LastResponse) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(last);
    }

    /// Send a request, returning the body of a 2xx response
    async fn execute(&self, request: Outgoing<'_>) -> Option<String> {
        let Outgoing {
            method,
            url,
            query,
            accept,
            body,
        } = request;
        let mut builder = self
            .client
            .request(method.into(), &url)
            .header(ACCEPT, accept);
        for (key, value) in &self.config.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some((payload, mime)) = body {
            builder = builder.header(CONTENT_TYPE, mime).body(payload);
        }

        debug!("{method} {url}");
        let mut last = LastResponse {
            method,
            url,
            ..LastResponse::default()
        };
        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                error!("{method} {} failed: {err}", last.url);
                last.error = Some(err.to_string());
                self.record(last);
                return None;
            }
        };

        let status = response.status();
        last.status = Some(status.as_u16());
        last.url = response.url().to_string();
        last.headers = response
            .headers()
            .iter()
            .map(|(key, value)| {
                (
                    key.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                error!("Unable to read response of {}: {err}", last.url);
                last.error = Some(err.to_string());
                self.record(last);
                return None;
            }
        };
        last.body = Some(text.clone());

        if !status.is_success() {
            log_failure(&last);
            self.record(last);
            return None;
        }
        self.record(last);
        Some(text)
    }

    async fn send_json(
        &self,
        method: Method,
        path: &str,
        query: &QueryParams,
        body: Option<(&JsonValue, &str)>,
    ) -> Option<JsonValue> {
        let body = match body {
            Some((value, mime)) => match serde_json::to_string(value) {
                Ok(payload) => Some((payload, mime)),
                Err(err) => {
                    error!("Unable to encode {method} body for {path}: {err}");
                    return None;
                }
            },
            None => None,
        };
        let text = self
            .execute(Outgoing {
                method,
                url: self.build_url(path),
                query,
                accept: &self.config.accept,
                body,
            })
            .await?;
        Some(decode(&text))
    }
}

/// Decode a successful body; empty or malformed bodies read as `{}`
fn decode(text: &str) -> JsonValue {
    if text.trim().is_empty() {
        return JsonValue::Object(JsonObject::new());
    }
    serde_json::from_str(text).unwrap_or_else(|err| {
        warn!("Response body is not valid JSON: {err}");
        JsonValue::Object(JsonObject::new())
    })
}

#[async_trait]
impl Connexion for HttpConnexion {
    async fn get(&self, path: &str, query: &QueryParams) -> Option<JsonValue> {
        self.send_json(Method::GET, path, query, None).await
    }

    async fn get_raw(&self, path: &str, query: &QueryParams, absolute: bool) -> Option<String> {
        let url = if absolute && !path.is_empty() {
            path.to_string()
        } else {
            self.build_url(path)
        };
        self.execute(Outgoing {
            method: Method::GET,
            url,
            query,
            accept: TEXT_MIME,
            body: None,
        })
        .await
    }

    async fn post(&self, path: &str, body: &JsonValue) -> Option<JsonValue> {
        self.send_json(Method::POST, path, &QueryParams::new(), Some((body, JSON_MIME)))
            .await
    }

    async fn put(&self, path: &str, body: &JsonValue) -> Option<JsonValue> {
        self.send_json(Method::PUT, path, &QueryParams::new(), Some((body, JSON_MIME)))
            .await
    }

    async fn patch(&self, path: &str, body: Option<&JsonValue>) -> Option<JsonValue> {
        let mime = if self.config.patch_mime.is_empty() {
            JSON_MIME
        } else {
            self.config.patch_mime.as_str()
        };
        let null = JsonValue::Null;
        let body = body.unwrap_or(&null);
        self.send_json(Method::PATCH, path, &QueryParams::new(), Some((body, mime)))
            .await
    }

    async fn delete(&self, path: &str) -> Option<JsonValue> {
        self.send_json(Method::DELETE, path, &QueryParams::new(), None)
            .await
    }

    fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    fn last_response(&self) -> Option<LastResponse> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl std::fmt::Debug for HttpConnexion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConnexion")
            .field("endpoint", &self.config.endpoint)
            .field("timeout", &self.config.timeout)
            .field("accept", &self.config.accept)
            .finish_non_exhaustive()
    }
}
