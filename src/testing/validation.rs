//! Declarative response checks.

use std::cmp::Ordering;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ValidationResult;
use crate::http::response::HttpResponse;

/// Part of the HTTP response a validation looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "camelCase")]
pub enum ValidationTarget {
    Status,
    Header { name: String },
    /// Dot separated path into the JSON body; numeric segments index arrays.
    Json {
        #[serde(default)]
        path: String,
    },
    Body,
}

/// Comparison operator for a validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationOperator {
    #[default]
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    /// `expected: false` turns this into "must be absent".
    Exists,
}

/// A single check that can be evaluated against a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    #[serde(flatten)]
    pub target: ValidationTarget,
    #[serde(default)]
    pub operator: ValidationOperator,
    #[serde(default)]
    pub expected: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Display for ValidationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationTarget::Status => write!(f, "status"),
            ValidationTarget::Header { name } => write!(f, "header `{name}`"),
            ValidationTarget::Json { path } if path.is_empty() => write!(f, "json body"),
            ValidationTarget::Json { path } => write!(f, "json `{path}`"),
            ValidationTarget::Body => write!(f, "body"),
        }
    }
}

impl Display for ValidationOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValidationOperator::Equals => "equals",
            ValidationOperator::NotEquals => "does not equal",
            ValidationOperator::Contains => "contains",
            ValidationOperator::GreaterThan => "is greater than",
            ValidationOperator::LessThan => "is less than",
            ValidationOperator::Exists => "exists",
        };
        write!(f, "{label}")
    }
}

impl ValidationTarget {
    fn extract(&self, response: &HttpResponse) -> Option<Value> {
        match self {
            ValidationTarget::Status => Some(Value::from(response.status)),
            ValidationTarget::Header { name } => response.header(name).map(Value::from),
            ValidationTarget::Json { path } => serde_json::from_str::<Value>(&response.body)
                .ok()
                .and_then(|document| lookup(&document, path).cloned()),
            ValidationTarget::Body => Some(Value::String(response.body.clone())),
        }
    }
}

impl ValidationOperator {
    fn apply(self, actual: Option<&Value>, expected: &Value) -> bool {
        match self {
            ValidationOperator::Exists => actual.is_some() != expects_absence(expected),
            ValidationOperator::Equals => actual.is_some_and(|a| loose_eq(a, expected)),
            ValidationOperator::NotEquals => !actual.is_some_and(|a| loose_eq(a, expected)),
            ValidationOperator::Contains => actual.is_some_and(|a| contains(a, expected)),
            ValidationOperator::GreaterThan => compare(actual, expected) == Some(Ordering::Greater),
            ValidationOperator::LessThan => compare(actual, expected) == Some(Ordering::Less),
        }
    }
}

impl Validation {
    pub fn describe(&self) -> String {
        if let Some(description) = &self.description {
            return description.clone();
        }

        match self.operator {
            ValidationOperator::Exists if expects_absence(&self.expected) => {
                format!("{} is absent", self.target)
            }
            ValidationOperator::Exists => format!("{} exists", self.target),
            operator => format!("{} {} {}", self.target, operator, self.expected),
        }
    }

    pub fn evaluate(&self, response: &HttpResponse) -> ValidationResult {
        let actual = self.target.extract(response);
        let valid = self.operator.apply(actual.as_ref(), &self.expected);

        let mut result = ValidationResult::new(valid, self.describe());
        if !(self.operator == ValidationOperator::Exists && self.expected.is_null()) {
            result.expected = Some(self.expected.clone());
        }
        if !valid {
            result.message = Some(self.failure_message(actual.as_ref()));
        }
        result.actual = actual;
        result
    }

    fn failure_message(&self, actual: Option<&Value>) -> String {
        match (self.operator, actual) {
            (ValidationOperator::Exists, Some(actual)) => {
                format!("expected {} to be absent, got {actual}", self.target)
            }
            (_, None) => format!("{} was not present in the response", self.target),
            (operator, Some(actual)) => {
                format!("expected {} {} {}, got {actual}", self.target, operator, self.expected)
            }
        }
    }
}

fn expects_absence(expected: &Value) -> bool {
    matches!(expected, Value::Bool(false))
}

/// Resolve a dot path such as `data.items.0.id` (an optional `$` prefix is
/// accepted). An empty path selects the whole document.
fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.trim();
    let path = path.strip_prefix('$').unwrap_or(path).trim_start_matches('.');
    if path.is_empty() {
        return Some(document);
    }

    path.split('.').try_fold(document, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Equality that lets `"200"` match `200` (headers are always text).
fn loose_eq(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    if let (Some(a), Some(b)) = (as_number(actual), as_number(expected)) {
        return a == b;
    }
    matches!((scalar_text(actual), scalar_text(expected)), (Some(a), Some(b)) if a == b)
}

fn contains(actual: &Value, expected: &Value) -> bool {
    match actual {
        Value::Array(items) => items.iter().any(|item| loose_eq(item, expected)),
        Value::Object(map) => expected.as_str().is_some_and(|key| map.contains_key(key)),
        other => match (scalar_text(other), scalar_text(expected)) {
            (Some(haystack), Some(needle)) => haystack.contains(&needle),
            _ => false,
        },
    }
}

fn compare(actual: Option<&Value>, expected: &Value) -> Option<Ordering> {
    let actual = as_number(actual?)?;
    let expected = as_number(expected)?;
    actual.partial_cmp(&expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn response(status: u16, body: &str) -> HttpResponse {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json; charset=utf-8".to_string());
        headers.insert("x-count".to_string(), "12".to_string());
        HttpResponse {
            status,
            status_text: "OK".to_string(),
            headers,
            body: body.to_string(),
            duration_ms: 3,
            size_bytes: body.len(),
        }
    }

    fn validation(value: Value) -> Validation {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn deserializes_flat_shape() {
        let v = validation(json!({"target": "header", "name": "content-type", "operator": "contains", "expected": "json"}));
        assert_eq!(
            v.target,
            ValidationTarget::Header {
                name: "content-type".to_string()
            }
        );
        assert_eq!(v.operator, ValidationOperator::Contains);

        let v = validation(json!({"target": "status", "expected": 200}));
        assert_eq!(v.operator, ValidationOperator::Equals);

        assert!(serde_json::from_value::<Validation>(json!({"target": "cookie"})).is_err());
    }

    #[test]
    fn status_equals() {
        let res = response(200, "");
        assert!(validation(json!({"target": "status", "expected": 200})).evaluate(&res).valid);

        let result = validation(json!({"target": "status", "expected": 201})).evaluate(&res);
        assert!(!result.valid);
        assert_eq!(result.actual, Some(json!(200)));
        assert_eq!(result.message.as_deref(), Some("expected status equals 201, got 200"));
    }

    #[test]
    fn header_is_case_insensitive_and_loosely_typed() {
        let res = response(200, "");
        assert!(validation(json!({"target": "header", "name": "Content-Type", "operator": "contains", "expected": "json"})).evaluate(&res).valid);
        assert!(validation(json!({"target": "header", "name": "X-Count", "expected": 12})).evaluate(&res).valid);
        assert!(validation(json!({"target": "header", "name": "x-count", "operator": "greaterThan", "expected": 10})).evaluate(&res).valid);
    }

    #[test]
    fn missing_header_fails_with_message() {
        let result = validation(json!({"target": "header", "name": "etag", "expected": "abc"})).evaluate(&response(200, ""));
        assert!(!result.valid);
        assert_eq!(result.actual, None);
        assert_eq!(
            result.message.as_deref(),
            Some("header `etag` was not present in the response")
        );
    }

    #[test]
    fn json_path_lookup() {
        let res = response(200, r#"{"token": "t-1", "items": [{"id": 4}, {"id": 5}], "nothing": null}"#);
        assert!(validation(json!({"target": "json", "path": "token", "operator": "exists"})).evaluate(&res).valid);
        assert!(validation(json!({"target": "json", "path": "items.1.id", "expected": 5})).evaluate(&res).valid);
        assert!(validation(json!({"target": "json", "path": "$.items.0.id", "operator": "lessThan", "expected": 5})).evaluate(&res).valid);
        assert!(validation(json!({"target": "json", "path": "nothing", "operator": "exists"})).evaluate(&res).valid);
        assert!(validation(json!({"target": "json", "path": "missing", "operator": "exists", "expected": false})).evaluate(&res).valid);
        assert!(!validation(json!({"target": "json", "path": "items.9", "operator": "exists"})).evaluate(&res).valid);
        assert!(validation(json!({"target": "json", "path": "items", "operator": "contains", "expected": {"id": 4}})).evaluate(&res).valid);
        assert!(validation(json!({"target": "json", "operator": "contains", "expected": "token"})).evaluate(&res).valid);
    }

    #[test]
    fn json_target_on_non_json_body_is_absent() {
        let result = validation(json!({"target": "json", "path": "a", "operator": "exists"})).evaluate(&response(200, "<html>"));
        assert!(!result.valid);
    }

    #[test]
    fn body_and_not_equals() {
        let res = response(200, "hello world");
        assert!(validation(json!({"target": "body", "operator": "contains", "expected": "world"})).evaluate(&res).valid);
        assert!(validation(json!({"target": "body", "operator": "notEquals", "expected": "bye"})).evaluate(&res).valid);
        assert!(!validation(json!({"target": "body", "operator": "notEquals", "expected": "hello world"})).evaluate(&res).valid);
    }

    #[test]
    fn comparisons_need_numbers() {
        let res = response(200, r#"{"name": "ada"}"#);
        assert!(!validation(json!({"target": "json", "path": "name", "operator": "greaterThan", "expected": 1})).evaluate(&res).valid);
    }

    #[test]
    fn describe_uses_custom_description() {
        let v = validation(json!({"target": "status", "expected": 200, "description": "is ok"}));
        assert_eq!(v.describe(), "is ok");
        let v = validation(json!({"target": "json", "path": "id", "operator": "exists"}));
        assert_eq!(v.describe(), "json `id` exists");
        let v = validation(json!({"target": "status", "operator": "lessThan", "expected": 500}));
        assert_eq!(v.describe(), "status is less than 500");
    }
}
