//! # Run configuration
//!
//! An arbitrary JSON object loaded from `--config-file` and overlaid with
//! `--config-string`. The orchestration core only passes it along; the HTTP
//! builder and the reporters read the few keys they understand.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::LoadError;
use crate::storage::{json_type_name, read_json_object};

const VARIABLES_KEY: &str = "variables";
const TIMEOUT_KEY: &str = "timeoutMs";
const BASE_URL_KEY: &str = "baseUrl";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Config {
    values: Map<String, Value>,
}

impl Config {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Shallow merge: top-level keys of `overrides` replace existing ones.
    pub fn merge(&mut self, overrides: Map<String, Value>) {
        for (key, value) in overrides {
            self.values.insert(key, value);
        }
    }

    /// `{{name}}` substitution values. Scalars are stringified; nested values
    /// and nulls are ignored.
    pub fn variables(&self) -> HashMap<String, String> {
        let Some(Value::Object(map)) = self.get(VARIABLES_KEY) else {
            return HashMap::new();
        };

        map.iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some((key.clone(), value))
            })
            .collect()
    }

    /// Per-request timeout. Zero or a non-integer value means no timeout.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.get(TIMEOUT_KEY)
            .and_then(Value::as_u64)
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    pub fn base_url(&self) -> Option<&str> {
        self.get(BASE_URL_KEY)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Load the config file (if any) and apply the inline config string on top.
pub fn load_config(path: Option<&Path>, inline: Option<&str>) -> Result<Config, LoadError> {
    let mut config = match path {
        Some(path) => {
            let config = Config::new(read_json_object("config", path)?);
            debug!(path = %path.display(), keys = config.values.len(), "loaded config file");
            config
        }
        None => Config::default(),
    };

    if let Some(raw) = inline.map(str::trim).filter(|raw| !raw.is_empty()) {
        config.merge(parse_config_string(raw)?);
    }

    if config.is_empty() {
        debug!("running without config");
    }
    Ok(config)
}

fn parse_config_string(raw: &str) -> Result<Map<String, Value>, LoadError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| LoadError::ConfigString(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(LoadError::ConfigString(format!(
            "expected a JSON object, found {}",
            json_type_name(&other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config(value: Value) -> Config {
        match value {
            Value::Object(map) => Config::new(map),
            _ => panic!("config fixture must be an object"),
        }
    }

    #[test]
    fn no_sources_gives_empty_config() {
        let config = load_config(None, None).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn config_string_overrides_file_keys() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(file, r#"{{"baseUrl": "http://file", "timeoutMs": 100}}"#).unwrap();

        let config = load_config(Some(file.path()), Some(r#"{"baseUrl": "http://inline"}"#)).unwrap();
        assert_eq!(config.base_url(), Some("http://inline"));
        assert_eq!(config.request_timeout(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn config_string_must_be_object() {
        let err = load_config(None, Some("[1]")).unwrap_err();
        assert!(matches!(err, LoadError::ConfigString(_)));

        let err = load_config(None, Some("{oops")).unwrap_err();
        assert!(matches!(err, LoadError::ConfigString(_)));
    }

    #[test]
    fn blank_config_string_is_ignored() {
        let config = load_config(None, Some("  ")).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn variables_stringify_scalars() {
        let config = config(json!({
            "variables": { "host": "example.com", "port": 8080, "secure": true, "nested": {"a": 1}, "nothing": null }
        }));

        let vars = config.variables();
        assert_eq!(vars.len(), 3);
        assert_eq!(vars.get("host").unwrap(), "example.com");
        assert_eq!(vars.get("port").unwrap(), "8080");
        assert_eq!(vars.get("secure").unwrap(), "true");
    }

    #[test]
    fn zero_timeout_means_none() {
        let config = config(json!({ "timeoutMs": 0 }));
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn blank_base_url_means_none() {
        let config = config(json!({ "baseUrl": "  " }));
        assert_eq!(config.base_url(), None);
    }
}
