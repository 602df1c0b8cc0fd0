//! Endpoint definition documents (JSON, TOML, YAML)

use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};

/// Read a definition document, picking the format from the file extension
pub fn load_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;

    let document: Value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        Some("toml") => toml::from_str(&content)?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        _ => {
            return Err(Error::InvalidDocument(format!(
                "unsupported document format: {}",
                path.display()
            )))
        }
    };

    tracing::debug!("Loaded endpoint document {:?}", path);
    Ok(document)
}

/// JSON type name, for error messages
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
