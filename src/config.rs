//! Configuration types for connector definitions
//!
//! A connector is configured by one YAML (or JSON) document: remote host,
//! credentials, dialect, list and HAL options, per-model overrides and an
//! optional inline schema. String values may use `{{ env.NAME }}` and
//! `{{ vars.NAME }}` templates, `vars` being a top-level map of the same
//! document.

use crate::action::{HalOptions, ListOptions};
use crate::connexion::{HttpConnexionConfig, DEFAULT_TIMEOUT_SECS, MERGE_PATCH_MIME};
use crate::error::{Error, Result, ResultExt};
use crate::loader::ModelDefinition;
use crate::template::{render_value, TemplateContext};
use crate::types::{ActionKind, Dialect, JsonValue, Method, OptionStringExt};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Header carrying the API key unless configured otherwise
pub const DEFAULT_API_KEY_HEADER: &str = "api-key";

// ============================================================================
// Top-Level Connector Config
// ============================================================================

/// Complete connector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Base URL of the remote API
    pub host: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Header name the API key is sent as
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,

    /// Static headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub dialect: Dialect,

    /// Response MIME override; the dialect decides otherwise
    #[serde(default)]
    pub accept: Option<String>,

    #[serde(default = "default_patch_mime")]
    pub patch_mime: String,

    /// Fixed UTC offset such as `+02:00`
    #[serde(default)]
    pub timezone: Option<String>,

    /// Metadata cache location
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    #[serde(default)]
    pub list: ListOptions,

    #[serde(default)]
    pub hal: HalOptions,

    /// Per-model overrides, keyed by model name
    #[serde(default)]
    pub models: BTreeMap<String, ModelConfig>,

    /// Inline model definitions
    #[serde(default)]
    pub schema: Vec<ModelDefinition>,
}

fn default_api_key_header() -> String {
    DEFAULT_API_KEY_HEADER.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_patch_mime() -> String {
    MERGE_PATCH_MIME.to_string()
}

// ============================================================================
// Model Config
// ============================================================================

/// Overrides applied to the visitor of one model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub collection_uri: Option<String>,
    /// Item URI template, `{id}` being replaced by the item id
    pub item_uri: Option<String>,
    /// Replaces the default exclusion list
    pub exclude: Option<Vec<String>>,
    pub create: ActionKind,
    pub update: ActionKind,
    pub delete: ActionKind,
    /// `PATCH` or `PUT`
    pub update_method: Option<Method>,
    /// Post every writable field on create, not only the required ones
    pub full_create: bool,
}

// ============================================================================
// Loading
// ============================================================================

impl ConnectorConfig {
    /// Minimal configuration pointing at `host`
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api_key: None,
            api_key_header: default_api_key_header(),
            headers: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
            dialect: Dialect::default(),
            accept: None,
            patch_mime: default_patch_mime(),
            timezone: None,
            cache_dir: None,
            list: ListOptions::default(),
            hal: HalOptions::default(),
            models: BTreeMap::new(),
            schema: Vec::new(),
        }
    }

    /// Load and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_str_with(&content, &TemplateContext::from_env())
    }

    /// Parse a YAML or JSON document, interpolating templates from `ctx`
    ///
    /// The document's own `vars` map is added to the context.
    pub fn from_str_with(content: &str, ctx: &TemplateContext) -> Result<Self> {
        let mut raw: JsonValue = serde_yaml::from_str(content)?;
        let mut ctx = ctx.clone();
        if let Some(vars) = raw.as_object_mut().and_then(|map| map.remove("vars")) {
            ctx.vars = vars;
        }
        let rendered = render_value(&raw, &ctx)?;
        let config: Self = serde_json::from_value(rendered)?;
        config.validate()?;
        Ok(config)
    }

    /// Check structural validity of the configuration
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::missing_field("host"));
        }
        url::Url::parse(&self.host)
            .map_err(|e| Error::invalid_value("host", e.to_string()))?;
        if self.timeout_secs == 0 {
            return Err(Error::invalid_value("timeout_secs", "must be positive"));
        }
        self.timezone()?;
        if let Some(dir) = &self.cache_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(Error::invalid_value(
                    "cache_dir",
                    format!("'{}' is not a directory", dir.display()),
                ));
            }
        }
        Ok(())
    }

    /// Check the settings required to talk to the API
    pub fn self_test(&self) -> Result<()> {
        if self.host.clone().none_if_empty().is_none() {
            return Err(Error::missing_field("host"));
        }
        if self.api_key.clone().none_if_empty().is_none() {
            return Err(Error::missing_field("api_key"));
        }
        self.validate()
    }

    // ========================================================================
    // Derived Settings
    // ========================================================================

    /// Offset used for date and datetime fields
    pub fn timezone(&self) -> Result<FixedOffset> {
        let utc = FixedOffset::east_opt(0).ok_or_else(|| Error::config("UTC offset"))?;
        match self.timezone.as_deref().map(str::trim) {
            None | Some("" | "UTC" | "Z") => Ok(utc),
            Some(offset) => offset
                .parse::<FixedOffset>()
                .map_err(|e| Error::invalid_value("timezone", format!("'{offset}': {e}"))),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Settings of the HTTP connexion
    pub fn connexion_config(&self) -> HttpConnexionConfig {
        let mut builder = HttpConnexionConfig::builder()
            .endpoint(&self.host)
            .timeout(self.timeout())
            .dialect(self.dialect)
            .patch_mime(&self.patch_mime);
        if let Some(accept) = &self.accept {
            builder = builder.accept(accept);
        }
        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }
        if let Some(key) = self.api_key.clone().none_if_empty() {
            builder = builder.header(&self.api_key_header, key);
        }
        builder.build()
    }

    /// Overrides of a model, defaults when none are configured
    pub fn model(&self, name: &str) -> ModelConfig {
        self.models.get(name).cloned().unwrap_or_default()
    }
}
