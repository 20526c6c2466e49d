use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::LoadError;

/// Read `path` and parse it as a JSON object.
pub fn read_json_object(kind: &'static str, path: &Path) -> Result<Map<String, Value>, LoadError> {
    let raw = fs::read_to_string(path).map_err(|source| LoadError::Read {
        kind,
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value = serde_json::from_str(&raw).map_err(|source| LoadError::Parse {
        kind,
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(LoadError::Shape {
            kind,
            path: path.to_path_buf(),
            message: format!("expected a JSON object, found {}", json_type_name(&other)),
        }),
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
