//! YAML Loader module
//!
//! Parse model definitions from YAML files.
//!
//! # Overview
//!
//! The loader module provides:
//! - `SchemaDefinition` - declarative list of models
//! - `ModelDefinition` / `FieldDefinition` - one model and its fields
//! - YAML parsing with validation, producing `ModelDef` tables

mod parser;
mod types;

pub use parser::{load_models, load_models_from_str, to_model_defs};
pub use types::{
    ChoiceDefinition, FieldDefinition, FieldKind, MicrodataDefinition, ModelDefinition,
    SchemaDefinition,
};
