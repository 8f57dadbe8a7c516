//! Template interpolation for YAML configs
//!
//! Handles `{{ env.NAME }}` and `{{ vars.path }}` interpolation in string
//! values of a connector configuration. A bare `{{ name }}` reads `vars`.

use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ variable.path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}")
        .expect("template pattern is valid")
});

/// Context for template interpolation
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Environment variables, as a flat string map
    pub env: Value,
    /// User variables declared next to the configuration
    pub vars: Value,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context reading the process environment
    pub fn from_env() -> Self {
        let env = std::env::vars()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        Self {
            env: Value::Object(env),
            vars: Value::Null,
        }
    }

    #[must_use]
    pub fn with_env(mut self, env: Value) -> Self {
        self.env = env;
        self
    }

    #[must_use]
    pub fn with_vars(mut self, vars: Value) -> Self {
        self.vars = vars;
        self
    }

    /// Get a value by path (e.g., "env.API_KEY")
    pub fn get(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('.').collect();
        let (root, rest) = match parts.split_first()? {
            (&"env", rest) => (&self.env, rest),
            (&"vars", rest) => (&self.vars, rest),
            _ => (&self.vars, parts.as_slice()),
        };
        get_nested_value(root, rest)
    }
}

/// Get a nested value from a JSON value by path
fn get_nested_value<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for part in path {
        match current {
            Value::Object(map) => {
                current = map.get(*part)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Render a template string with the given context
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    if TEMPLATE_REGEX.replace_all(template, "").contains("{{") {
        return Err(Error::template(format!("Malformed placeholder in '{template}'")));
    }

    let mut missing = Vec::new();
    let rendered = TEMPLATE_REGEX.replace_all(template, |cap: &regex::Captures<'_>| {
        match ctx.get(&cap[1]) {
            Some(value) => value_to_string(value),
            None => {
                missing.push(cap[1].to_string());
                cap[0].to_string()
            }
        }
    });
    let rendered = rendered.into_owned();

    if missing.is_empty() {
        Ok(rendered)
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Check if a string contains template variables
pub fn has_templates(s: &str) -> bool {
    TEMPLATE_REGEX.is_match(s)
}

/// Extract all variable names from a template
pub fn extract_variables(template: &str) -> Vec<String> {
    TEMPLATE_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Convert a JSON value to a string for template substitution
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Render all string values of a JSON tree; keys are left untouched
pub fn render_value(value: &Value, ctx: &TemplateContext) -> Result<Value> {
    match value {
        Value::String(s) if has_templates(s) => Ok(Value::String(render(s, ctx)?)),
        Value::Object(map) => {
            let mut rendered = serde_json::Map::new();
            for (key, value) in map {
                rendered.insert(key.clone(), render_value(value, ctx)?);
            }
            Ok(Value::Object(rendered))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| render_value(item, ctx))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        _ => Ok(value.clone()),
    }
}
