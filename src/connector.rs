//! Connector façade
//!
//! Owns the configuration, the model registry, the shared connexion and
//! one `ApiObject` adapter per registered model.

use crate::action::{
    CreateOptions, HalList, HalLoad, JsonCreate, JsonList, JsonUpdate, NullAction, RejectedAction,
    UpdateOptions,
};
use crate::adapter::ApiObject;
use crate::config::{ConnectorConfig, ModelConfig};
use crate::connexion::{Connexion, HttpConnexion};
use crate::descriptor::Descriptor;
use crate::error::{Error, Result};
use crate::hydrator::Hydrator;
use crate::loader::to_model_defs;
use crate::schema::ModelDef;
use crate::types::{ActionKind, Dialect, Method, QueryParams};
use crate::visitor::Visitor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

// ============================================================================
// Check Result
// ============================================================================

/// Result of a connection check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub success: bool,

    /// Error message if failed
    pub message: Option<String>,
}

impl CheckResult {
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Connector
// ============================================================================

pub struct Connector {
    config: ConnectorConfig,
    descriptor: Arc<Descriptor>,
    connexion: Arc<dyn Connexion>,
    objects: BTreeMap<String, ApiObject>,
}

impl Connector {
    /// Connector over the configured schema plus `models`
    pub fn new(config: ConnectorConfig, models: Vec<ModelDef>) -> Result<Self> {
        let connexion: Arc<dyn Connexion> =
            Arc::new(HttpConnexion::new(config.connexion_config())?);
        Self::with_connexion(config, models, connexion)
    }

    /// Load a configuration file and build a connector from its schema
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(ConnectorConfig::from_file(path)?, Vec::new())
    }

    /// Connector using an existing connexion
    pub fn with_connexion(
        config: ConnectorConfig,
        models: Vec<ModelDef>,
        connexion: Arc<dyn Connexion>,
    ) -> Result<Self> {
        config.validate()?;
        let mut all = to_model_defs(&config.schema)?;
        all.extend(models);

        let mut descriptor = Descriptor::from_models(all)?;
        descriptor.validate_relations()?;
        for (model, overrides) in &config.models {
            if let Some(exclude) = &overrides.exclude {
                descriptor.set_exclusions(model, exclude.clone())?;
            }
        }
        let descriptor = Arc::new(descriptor);

        let mut objects = BTreeMap::new();
        for model in descriptor.model_names() {
            let visitor = build_visitor(&config, &descriptor, &connexion, model)?;
            objects.insert(model.to_string(), ApiObject::new(visitor)?);
        }
        debug!(models = objects.len(), endpoint = connexion.endpoint(), "Connector ready");

        Ok(Self {
            config,
            descriptor,
            connexion,
            objects,
        })
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn connexion(&self) -> &dyn Connexion {
        self.connexion.as_ref()
    }

    /// Registered model names, sorted
    pub fn model_names(&self) -> Vec<&str> {
        self.objects.keys().map(String::as_str).collect()
    }

    /// Adapter of a model
    pub fn object(&self, model: &str) -> Option<&ApiObject> {
        let object = self.objects.get(model);
        if object.is_none() {
            warn!("Model '{model}' is not registered");
        }
        object
    }

    pub fn object_mut(&mut self, model: &str) -> Option<&mut ApiObject> {
        let object = self.objects.get_mut(model);
        if object.is_none() {
            warn!("Model '{model}' is not registered");
        }
        object
    }

    // ========================================================================
    // Connection Checks
    // ========================================================================

    /// Check the settings required to talk to the API
    pub fn self_test(&self) -> CheckResult {
        match self.config.self_test() {
            Ok(()) => CheckResult::success(),
            Err(e) => {
                error!("Self test failed: {e}");
                CheckResult::failure(e.to_string())
            }
        }
    }

    /// GET the endpoint root
    pub async fn ping(&self) -> CheckResult {
        match self.connexion.get_raw("", &QueryParams::new(), false).await {
            Some(_) => {
                info!("Ping succeeded on {}", self.connexion.endpoint());
                CheckResult::success()
            }
            None => CheckResult::failure(self.failure_message()),
        }
    }

    /// GET `path` with the configured credentials
    pub async fn connect(&self, path: &str) -> CheckResult {
        match self.connexion.get(path, &QueryParams::new()).await {
            Some(_) => {
                info!("Connected to {}", self.connexion.endpoint());
                CheckResult::success()
            }
            None => CheckResult::failure(self.failure_message()),
        }
    }

    fn failure_message(&self) -> String {
        match self.connexion.last_response() {
            Some(last) => match (last.status, last.error) {
                (Some(status), _) => {
                    Error::http_status(status, last.body.unwrap_or_default()).to_string()
                }
                (None, Some(error)) => error,
                (None, None) => format!("No answer from {}", last.url),
            },
            None => "No request sent".to_string(),
        }
    }
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("endpoint", &self.connexion.endpoint())
            .field("dialect", &self.config.dialect)
            .field("models", &self.model_names())
            .finish_non_exhaustive()
    }
}

/// Visitor of one model, with dialect actions and configured overrides
fn build_visitor(
    config: &ConnectorConfig,
    descriptor: &Arc<Descriptor>,
    connexion: &Arc<dyn Connexion>,
    model: &str,
) -> Result<Visitor> {
    let hydrator = Hydrator::new(Arc::clone(descriptor));
    let visitor = Visitor::for_dialect(config.dialect, Arc::clone(connexion), hydrator, model)?
        .with_timezone(config.timezone()?);
    let visitor = match config.dialect {
        Dialect::Json => visitor.with_list_action(JsonList::new(config.list.clone())),
        Dialect::JsonHal => visitor
            .with_list_action(HalList::new(config.list.clone(), config.hal.clone()))
            .with_load_action(HalLoad::new(config.hal.clone())),
    };
    Ok(apply_overrides(visitor, &config.model(model)))
}

fn apply_overrides(mut visitor: Visitor, overrides: &ModelConfig) -> Visitor {
    if let Some(uri) = &overrides.collection_uri {
        visitor = visitor.with_collection_uri(uri);
    }
    if let Some(uri) = &overrides.item_uri {
        visitor = visitor.with_item_uri(uri);
    }

    let create = CreateOptions {
        required_only: !overrides.full_create,
    };
    visitor = match overrides.create {
        ActionKind::Default => visitor.with_create_action(JsonCreate::new(create)),
        ActionKind::Null => visitor.with_create_action(NullAction),
        ActionKind::Rejected => visitor.with_create_action(RejectedAction),
    };

    let update = UpdateOptions {
        method: overrides.update_method.unwrap_or(Method::PATCH),
    };
    visitor = match overrides.update {
        ActionKind::Default => visitor.with_update_action(JsonUpdate::new(update)),
        ActionKind::Null => visitor.with_update_action(NullAction),
        ActionKind::Rejected => visitor.with_update_action(RejectedAction),
    };

    match overrides.delete {
        ActionKind::Default => visitor,
        ActionKind::Null => visitor.with_delete_action(NullAction),
        ActionKind::Rejected => visitor.with_delete_action(RejectedAction),
    }
}
