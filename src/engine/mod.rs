//! # Engine
//!
//! Drives one run of a suite: select the tests, build every invocation up
//! front, run them concurrently and fold the outcome into a [`Results`].

pub mod builder;
pub mod coordinator;
pub mod definition;
pub mod invocation;

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info};

pub use builder::HttpInvocationBuilder;
pub use coordinator::Coordinator;
pub use invocation::InvocationBuilder;

use crate::config::Config;
use crate::error::Result;
use crate::suite::TestSuite;
use crate::testing::filter::select_tests;
use crate::testing::{Results, Stats};

/// Run the suite and return the frozen report.
///
/// Building is all-or-nothing: if any selected test fails to build, nothing
/// runs. Once running, an execution error from any invocation ends the run
/// without a report. Tests that merely fail are part of the report.
pub async fn run_suite<B>(
    suite: &TestSuite,
    config: &Config,
    tags: Option<&HashSet<String>>,
    builder: &B,
    coordinator: &Coordinator,
) -> Result<Results>
where
    B: InvocationBuilder + ?Sized,
{
    let time_started = Utc::now();

    let selected = select_tests(&suite.tests, tags);
    info!(total = suite.len(), selected = selected.len(), "selected tests");

    let invocations = selected
        .iter()
        .map(|test| builder.build(test, &suite.templates, config))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    for invocation in &invocations {
        debug!(test = invocation.label(), "built invocation");
    }

    let test_results = coordinator.run_all(invocations).await?;
    let stats = Stats::aggregate(&test_results);
    info!(
        executed = stats.tests_executed,
        failed = stats.tests_failed,
        validations = stats.validations_performed,
        all_passed = stats.all_passed(),
        "run finished"
    );

    Ok(Results::assemble(time_started, test_results, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::invocation::Invocation;
    use crate::error::{BuildError, Error, ExecutionError};
    use crate::suite::{SuiteTemplates, Test};
    use crate::testing::{TestResult, TestStepResult, ValidationResult};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Reads the canned outcome straight from the test description:
    /// `passed`, `validations` (list of bools), `delayMs`, `buildError`,
    /// `executionError`.
    #[derive(Default)]
    struct ScriptedBuilder {
        built: Mutex<Vec<String>>,
    }

    impl InvocationBuilder for ScriptedBuilder {
        fn build(&self, test: &Test, _templates: &SuiteTemplates, _config: &Config) -> std::result::Result<Invocation, BuildError> {
            let description = test.description().clone();
            let label = test.id().unwrap_or("?").to_string();
            self.built.lock().unwrap().push(label.clone());

            if let Some(message) = description.get("buildError").and_then(Value::as_str) {
                return Err(BuildError::new(label, message));
            }

            let id = label.clone();
            Ok(Invocation::new(label, async move {
                if let Some(delay) = description.get("delayMs").and_then(Value::as_u64) {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                if let Some(message) = description.get("executionError").and_then(Value::as_str) {
                    return Err(ExecutionError::new(id, message));
                }
                let validations = description
                    .get("validations")
                    .and_then(Value::as_array)
                    .map(|flags| {
                        flags
                            .iter()
                            .map(|flag| ValidationResult::new(flag.as_bool().unwrap_or(false), "scripted"))
                            .collect()
                    })
                    .unwrap_or_default();
                let passed = description.get("passed").and_then(Value::as_bool).unwrap_or(true);
                let mut result = TestResult::new(passed, vec![TestStepResult::new(validations)]);
                result.id = Some(id);
                Ok(result)
            }))
        }
    }

    fn suite(tests: Value) -> TestSuite {
        serde_json::from_value(json!({ "tests": tests })).unwrap()
    }

    fn tags(list: &[&str]) -> HashSet<String> {
        list.iter().map(|tag| tag.to_string()).collect()
    }

    fn ids(results: &Results) -> Vec<&str> {
        results.test_results.iter().map(|r| r.id.as_deref().unwrap_or("")).collect()
    }

    #[tokio::test]
    async fn empty_suite_yields_zeroed_report() {
        let results = run_suite(&suite(json!([])), &Config::default(), None, &ScriptedBuilder::default(), &Coordinator::new())
            .await
            .unwrap();

        assert_eq!(results.stats(), Stats::default());
        assert!(results.test_results.is_empty());
        assert!(results.time_started <= results.time_ended);
        assert_eq!(results.exit_code(), 0);
    }

    #[tokio::test]
    async fn counts_tests_and_validations() {
        let suite = suite(json!([
            { "id": "a", "passed": true, "validations": [true, true] },
            { "id": "b", "passed": false, "validations": [true, false, false] }
        ]));

        let results = run_suite(&suite, &Config::default(), None, &ScriptedBuilder::default(), &Coordinator::new())
            .await
            .unwrap();

        assert_eq!(
            results.stats(),
            Stats {
                tests_executed: 2,
                tests_failed: 1,
                validations_performed: 5,
                validations_failed: 2,
            }
        );
        assert_eq!(results.exit_code(), 1);
    }

    #[tokio::test]
    async fn tag_filter_builds_only_matching_tests() {
        let suite = suite(json!([
            { "id": "login" },
            { "id": "logout" },
            { "name": "no id" },
            { "id": "signup" }
        ]));
        let builder = ScriptedBuilder::default();

        let results = run_suite(&suite, &Config::default(), Some(&tags(&["signup", "login", "missing"])), &builder, &Coordinator::new())
            .await
            .unwrap();

        assert_eq!(ids(&results), vec!["login", "signup"]);
        assert_eq!(*builder.built.lock().unwrap(), vec!["login".to_string(), "signup".to_string()]);
    }

    #[tokio::test]
    async fn build_error_aborts_before_anything_runs() {
        let suite = suite(json!([
            { "id": "a", "executionError": "must not run" },
            { "id": "b", "buildError": "no such template" }
        ]));

        let err = run_suite(&suite, &Config::default(), None, &ScriptedBuilder::default(), &Coordinator::new())
            .await
            .unwrap_err();

        match err {
            Error::Build(err) => {
                assert_eq!(err.test, "b");
                assert_eq!(err.message, "no such template");
            }
            other => panic!("expected a build error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn execution_error_yields_no_report() {
        let suite = suite(json!([
            { "id": "a", "passed": false },
            { "id": "b", "executionError": "connection pool poisoned" }
        ]));

        let err = run_suite(&suite, &Config::default(), None, &ScriptedBuilder::default(), &Coordinator::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Execution(ref e) if e.test == "b"));
    }

    #[tokio::test]
    async fn results_keep_suite_order() {
        let suite = suite(json!([
            { "id": "slow", "delayMs": 50 },
            { "id": "medium", "delayMs": 20 },
            { "id": "fast" }
        ]));

        let results = run_suite(&suite, &Config::default(), None, &ScriptedBuilder::default(), &Coordinator::new())
            .await
            .unwrap();

        assert_eq!(ids(&results), vec!["slow", "medium", "fast"]);
    }

    #[tokio::test]
    async fn works_through_a_trait_object() {
        let builder: Box<dyn InvocationBuilder> = Box::new(ScriptedBuilder::default());
        let results = run_suite(
            &suite(json!([{ "id": "a" }])),
            &Config::default(),
            None,
            builder.as_ref(),
            &Coordinator::new(),
        )
        .await
        .unwrap();

        assert_eq!(results.tests_executed, 1);
    }
}
