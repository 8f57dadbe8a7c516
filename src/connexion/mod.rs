//! Connexion module
//!
//! Transport boundary between the core and the remote API. Every verb
//! returns the decoded body, or `None` once any transport or HTTP failure
//! has been logged and recorded. Nothing else crosses this boundary.
//!
//! # Overview
//!
//! - `Connexion` - the trait actions and visitors depend on
//! - `HttpConnexion` - `reqwest` implementation with a fixed timeout
//! - `LastResponse` - diagnostics of the most recent exchange

mod client;
mod errors;

pub use client::{HttpConnexion, HttpConnexionConfig, HttpConnexionConfigBuilder};

use crate::types::{JsonValue, Method, QueryParams};
use async_trait::async_trait;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default MIME type of PATCH bodies
pub const MERGE_PATCH_MIME: &str = "application/merge-patch+json";

/// Transport used by actions
#[async_trait]
pub trait Connexion: Send + Sync {
    /// GET a JSON document
    async fn get(&self, path: &str, query: &QueryParams) -> Option<JsonValue>;

    /// GET a raw text body; `absolute` sends `path` as a full URL
    async fn get_raw(&self, path: &str, query: &QueryParams, absolute: bool) -> Option<String>;

    async fn post(&self, path: &str, body: &JsonValue) -> Option<JsonValue>;

    async fn put(&self, path: &str, body: &JsonValue) -> Option<JsonValue>;

    /// PATCH a document; `None` sends a JSON `null` body
    async fn patch(&self, path: &str, body: Option<&JsonValue>) -> Option<JsonValue>;

    async fn delete(&self, path: &str) -> Option<JsonValue>;

    /// Base URL every path is joined to
    fn endpoint(&self) -> &str;

    /// Diagnostics of the latest request, if any was sent
    fn last_response(&self) -> Option<LastResponse>;
}

/// Record of the latest exchange with the API
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LastResponse {
    pub method: Method,
    pub url: String,
    /// HTTP status, absent when the request never got an answer
    pub status: Option<u16>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Transport error message
    pub error: Option<String>,
}

impl LastResponse {
    /// Whether the exchange completed with a 2xx status
    pub fn is_success(&self) -> bool {
        self.status.is_some_and(|status| (200..300).contains(&status))
    }
}

#[cfg(test)]
mod tests;
