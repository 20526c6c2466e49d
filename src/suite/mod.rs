//! # Test suite
//!
//! The in-memory form of a suite file. Test descriptions and the three
//! template collections are kept as raw JSON: their shape belongs to the
//! invocation builder, not to the orchestration core.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::LoadError;
use crate::storage::{json_type_name, read_json_object};

/// One declarative test description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Test(Value);

impl Test {
    pub fn new(description: Value) -> Self {
        Self(description)
    }

    /// The identity used for tag matching. Absent or non-string ids yield `None`.
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn description(&self) -> &Value {
        &self.0
    }
}

/// Shared context forwarded verbatim to the invocation builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteTemplates {
    #[serde(default)]
    pub setup_and_teardowns: Map<String, Value>,
    #[serde(default)]
    pub request_templates: Map<String, Value>,
    #[serde(default)]
    pub response_templates: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    pub tests: Vec<Test>,
    #[serde(flatten)]
    pub templates: SuiteTemplates,
}

impl TestSuite {
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

pub fn load_suite(path: &Path) -> Result<TestSuite, LoadError> {
    let document = read_json_object("test", path)?;
    let suite = suite_from_object(document).map_err(|message| LoadError::Shape {
        kind: "test",
        path: path.to_path_buf(),
        message,
    })?;

    if suite.is_empty() {
        warn!(path = %path.display(), "test suite has no tests");
    } else {
        info!(path = %path.display(), tests = suite.len(), "loaded test suite");
    }
    Ok(suite)
}

fn suite_from_object(mut document: Map<String, Value>) -> Result<TestSuite, String> {
    let tests = match document.remove("tests") {
        Some(Value::Array(tests)) => tests.into_iter().map(Test::new).collect(),
        Some(other) => {
            return Err(format!("`tests` must be an array, found {}", json_type_name(&other)));
        }
        None => return Err("missing `tests` array".to_string()),
    };

    Ok(TestSuite {
        tests,
        templates: SuiteTemplates {
            setup_and_teardowns: take_collection(&mut document, "setupAndTeardowns")?,
            request_templates: take_collection(&mut document, "requestTemplates")?,
            response_templates: take_collection(&mut document, "responseTemplates")?,
        },
    })
}

fn take_collection(document: &mut Map<String, Value>, key: &str) -> Result<Map<String, Value>, String> {
    match document.remove(key) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(format!("`{key}` must be an object, found {}", json_type_name(&other))),
    }
}
