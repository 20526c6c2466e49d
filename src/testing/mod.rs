//! # Testing & Validations
//!
//! Result types for a run, from the single validation up to the assembled
//! report, together with the pure pieces of the orchestration core:
//!
//! - [`filter`]: tag based test selection
//! - [`stats`]: folding results into suite counters
//! - [`results`]: freezing the final report
//! - [`validation`]: evaluating declarative checks against a response

pub mod filter;
pub mod results;
pub mod stats;
pub mod validation;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use results::Results;
pub use stats::Stats;

/// Outcome of one validation within a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn new(valid: bool, description: impl Into<String>) -> Self {
        Self {
            valid,
            description: description.into(),
            expected: None,
            actual: None,
            message: None,
        }
    }
}

/// Outcome of one request/response exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStepResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Transport failure or skip reason; the step produced no response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub duration_ms: u64,
    pub validation_results: Vec<ValidationResult>,
}

impl TestStepResult {
    pub fn new(validation_results: Vec<ValidationResult>) -> Self {
        Self {
            validation_results,
            ..Self::default()
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none() && self.validation_results.iter().all(|v| v.valid)
    }
}

/// Outcome of one test. `passed` is decided by whoever ran the test and is
/// never recomputed from the step results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub passed: bool,
    #[serde(default)]
    pub duration_ms: u64,
    pub test_step_results: Vec<TestStepResult>,
}

impl TestResult {
    pub fn new(passed: bool, test_step_results: Vec<TestStepResult>) -> Self {
        Self {
            passed,
            test_step_results,
            ..Self::default()
        }
    }

    /// Label for reporting: name, then id, then a placeholder.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("<unnamed test>")
    }
}
