//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::connector::Connector;
use crate::config::ConnectorConfig;
use crate::error::{Error, Result};
use crate::loader::load_models;
use serde_json::{json, Value};
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command and print its output
    pub async fn run(&self) -> Result<()> {
        let output = self.execute().await?;
        self.output_message(&output);
        Ok(())
    }

    /// Run the CLI command, returning its output document
    pub async fn execute(&self) -> Result<Value> {
        let connector = self.load_connector()?;
        debug!(?connector, "Running command");

        match &self.cli.command {
            Commands::Validate => Ok(self.validate(&connector)),
            Commands::Models => Ok(json!({ "models": connector.model_names() })),
            Commands::Fields { model } => self.fields(&connector, model),
            Commands::List {
                model,
                filter,
                page_size,
                max,
            } => {
                self.list(&connector, model, filter.as_deref(), *page_size, *max)
                    .await
            }
            Commands::Load { model, id } => self.load(connector, model, id).await,
            Commands::Delete { model, id } => self.delete(&connector, model, id).await,
            Commands::Ping => {
                let result = connector.ping().await;
                Ok(serde_json::to_value(result)?)
            }
        }
    }

    /// Build the connector from the configuration and model files
    fn load_connector(&self) -> Result<Connector> {
        let config = ConnectorConfig::from_file(&self.cli.config)?;
        let models = match &self.cli.models {
            Some(path) => load_models(path)?,
            None => Vec::new(),
        };
        Connector::new(config, models)
    }

    fn validate(&self, connector: &Connector) -> Value {
        let check = connector.self_test();
        json!({
            "valid": check.success,
            "message": check.message,
            "endpoint": connector.connexion().endpoint(),
            "models": connector.model_names().len(),
        })
    }

    fn fields(&self, connector: &Connector, model: &str) -> Result<Value> {
        let object = connector
            .object(model)
            .ok_or_else(|| Error::unknown_model(model))?;
        Ok(serde_json::to_value(object.build_fields()?)?)
    }

    async fn list(
        &self,
        connector: &Connector,
        model: &str,
        filter: Option<&str>,
        page_size: usize,
        max: usize,
    ) -> Result<Value> {
        let object = connector
            .object(model)
            .ok_or_else(|| Error::unknown_model(model))?;
        let response = object
            .visitor()
            .list_with_pagination(filter, page_size, max)
            .await?;
        Ok(json!({
            "success": response.is_success(),
            "result": response.payload(),
        }))
    }

    async fn load(&self, mut connector: Connector, model: &str, id: &str) -> Result<Value> {
        let object = connector
            .object_mut(model)
            .ok_or_else(|| Error::unknown_model(model))?;
        let Some(instance) = object.load(id).await? else {
            return Ok(json!({ "success": false, "id": id }));
        };
        object.set_object(instance);

        let ids: Vec<String> = object
            .build_fields()?
            .into_iter()
            .map(|spec| spec.id)
            .collect();
        Ok(json!({
            "success": true,
            "id": object.object_identifier().unwrap_or_else(|| id.to_string()),
            "fields": object.get_fields(&ids)?,
        }))
    }

    async fn delete(&self, connector: &Connector, model: &str, id: &str) -> Result<Value> {
        let object = connector
            .object(model)
            .ok_or_else(|| Error::unknown_model(model))?;
        let success = object.delete(Some(id)).await?;
        Ok(json!({ "success": success, "id": id }))
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
