//! YAML parser for model definitions
//!
//! Parses and validates model definition files.

use crate::error::{Error, Result, ResultExt};
use crate::loader::types::{ModelDefinition, SchemaDefinition};
use crate::schema::ModelDef;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Load model definitions from a YAML file
pub fn load_models(path: impl AsRef<Path>) -> Result<Vec<ModelDef>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read model definitions '{}'", path.display()))?;
    load_models_from_str(&content)
}

/// Load model definitions from a YAML string
pub fn load_models_from_str(yaml: &str) -> Result<Vec<ModelDef>> {
    let def: SchemaDefinition = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse model YAML: {e}")))?;
    to_model_defs(&def.models)
}

/// Validate definitions and build the model tables
pub fn to_model_defs(models: &[ModelDefinition]) -> Result<Vec<ModelDef>> {
    validate_models(models)?;
    models.iter().map(ModelDefinition::to_model_def).collect()
}

fn validate_models(models: &[ModelDefinition]) -> Result<()> {
    let names: HashSet<&str> = models.iter().map(|m| m.name.as_str()).collect();
    if names.len() != models.len() {
        return Err(Error::config("Duplicate model names found"));
    }

    for model in models {
        validate_model(model, &names)?;
    }

    Ok(())
}

fn validate_model(model: &ModelDefinition, known: &HashSet<&str>) -> Result<()> {
    if model.name.trim().is_empty() {
        return Err(Error::config("Model name cannot be empty"));
    }

    let mut fields = HashSet::new();
    for field in &model.fields {
        if field.name.trim().is_empty() {
            return Err(Error::config(format!(
                "Model '{}' has a field without name",
                model.name
            )));
        }
        if !fields.insert(field.name.as_str()) {
            return Err(Error::config(format!(
                "Model '{}' declares '{}' twice",
                model.name, field.name
            )));
        }
        if let Some(target) = &field.target {
            if !known.contains(target.as_str()) {
                return Err(Error::config(format!(
                    "Field '{}::{}' targets unknown model '{target}'",
                    model.name, field.name
                )));
            }
        }
    }

    Ok(())
}
