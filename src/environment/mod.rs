//! # Variables
//!
//! `{{variable}}` interpolation for request definitions. Values come from the
//! `variables` object of the run config; unknown placeholders are left as is.

use std::collections::HashMap;

use serde_json::Value;

/// Interpolate `{{key}}` placeholders in a string using the provided variable map.
///
/// The input is scanned once, left to right. Substituted values are copied
/// verbatim, so a value that itself contains `{{other}}` is not expanded again.
pub fn interpolate(input: &str, variables: &HashMap<String, String>) -> String {
    if variables.is_empty() || !input.contains("{{") {
        return input.to_string();
    }

    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find("{{") {
        result.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];

        let Some(close) = after_open.find("}}") else {
            result.push_str(&rest[open..]);
            return result;
        };

        let key = &after_open[..close];
        match variables.get(key) {
            Some(value) => result.push_str(value),
            None => {
                result.push_str("{{");
                result.push_str(key);
                result.push_str("}}");
            }
        }
        rest = &after_open[close + 2..];
    }

    result.push_str(rest);
    result
}

/// Interpolate every string leaf of a JSON value. Object keys are left untouched.
pub fn interpolate_value(value: &Value, variables: &HashMap<String, String>) -> Value {
    match value {
        Value::String(s) => Value::String(interpolate(s, variables)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| interpolate_value(item, variables))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), interpolate_value(item, variables)))
                .collect(),
        ),
        other => other.clone(),
    }
}
