use std::time::Instant;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::definition::{Phase, PreparedStep, Resolver, SetupAndTeardown, TestDefinition};
use super::invocation::{Invocation, InvocationBuilder};
use crate::config::Config;
use crate::error::BuildError;
use crate::http::client::{build_client, send_request};
use crate::suite::{SuiteTemplates, Test};
use crate::testing::{TestResult, TestStepResult};

const SKIPPED: &str = "skipped: an earlier step could not be sent";

/// Builds invocations that execute their steps over HTTP.
///
/// All invocations share one connection pool; each owns its own steps and
/// results.
#[derive(Debug, Clone)]
pub struct HttpInvocationBuilder {
    client: Client,
}

impl HttpInvocationBuilder {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &Config) -> Result<Self, String> {
        Ok(Self::new(build_client(config.request_timeout())?))
    }
}

impl InvocationBuilder for HttpInvocationBuilder {
    fn build(&self, test: &Test, templates: &SuiteTemplates, config: &Config) -> Result<Invocation, BuildError> {
        let id = test.id().map(str::to_string);
        let definition: TestDefinition = serde_json::from_value(test.description().clone())
            .map_err(|err| BuildError::new(display_name(test), format!("invalid test description: {err}")))?;
        let label = id
            .clone()
            .or_else(|| definition.name.clone())
            .unwrap_or_else(|| "<unnamed test>".to_string());

        let hooks = resolve_hooks(&definition, templates).map_err(|message| BuildError::new(&label, message))?;

        let resolver = Resolver {
            request_templates: &templates.request_templates,
            response_templates: &templates.response_templates,
            variables: config.variables(),
            base_url: config.base_url(),
        };

        let phases = [
            (Phase::Setup, hooks.setup),
            (Phase::Main, definition.steps),
            (Phase::Teardown, hooks.teardown),
        ];
        let mut steps = Vec::new();
        for (phase, definitions) in phases {
            for (position, step) in definitions.into_iter().enumerate() {
                steps.push(
                    resolver
                        .prepare(step, phase, position)
                        .map_err(|message| BuildError::new(&label, message))?,
                );
            }
        }

        debug!(test = %label, steps = steps.len(), "prepared test");

        let client = self.client.clone();
        let name = definition.name;
        Ok(Invocation::new(label, async move {
            let mut result = execute_steps(&client, steps).await;
            result.id = id;
            result.name = name;
            Ok(result)
        }))
    }
}

fn display_name(test: &Test) -> String {
    test.id()
        .or_else(|| test.description().get("name").and_then(Value::as_str))
        .unwrap_or("<unnamed test>")
        .to_string()
}

fn resolve_hooks(definition: &TestDefinition, templates: &SuiteTemplates) -> Result<SetupAndTeardown, String> {
    let Some(name) = &definition.setup_and_teardown else {
        return Ok(SetupAndTeardown::default());
    };

    let hooks = templates
        .setup_and_teardowns
        .get(name)
        .ok_or_else(|| format!("unknown setupAndTeardown `{name}`"))?;
    serde_json::from_value(hooks.clone()).map_err(|err| format!("invalid setupAndTeardown `{name}`: {err}"))
}

/// Run steps in order. A step that cannot be sent skips the remaining setup
/// and test steps; teardown steps always run.
async fn execute_steps(client: &Client, steps: Vec<PreparedStep>) -> TestResult {
    let started = Instant::now();
    let mut step_results = Vec::with_capacity(steps.len());
    let mut broken = false;

    for step in steps {
        if broken && step.phase != Phase::Teardown {
            step_results.push(TestStepResult {
                name: Some(step.name),
                error: Some(SKIPPED.to_string()),
                ..TestStepResult::default()
            });
            continue;
        }

        let result = execute_step(client, step).await;
        if result.error.is_some() {
            broken = true;
        }
        step_results.push(result);
    }

    let passed = step_results.iter().all(TestStepResult::succeeded);
    let mut result = TestResult::new(passed, step_results);
    result.duration_ms = started.elapsed().as_millis() as u64;
    result
}

async fn execute_step(client: &Client, step: PreparedStep) -> TestStepResult {
    debug!(step = %step.name, method = %step.request.method, url = %step.request.url, "sending request");

    match send_request(client, &step.request).await {
        Ok(response) => {
            debug!(
                step = %step.name,
                status = response.status,
                reason = %response.status_text,
                bytes = response.size_bytes,
                "received response"
            );
            let mut result = TestStepResult::new(
                step.validations
                    .iter()
                    .map(|validation| validation.evaluate(&response))
                    .collect(),
            );
            result.name = Some(step.name);
            result.status = Some(response.status);
            result.duration_ms = response.duration_ms;
            result
        }
        Err(err) => TestStepResult {
            name: Some(step.name),
            error: Some(err),
            ..TestStepResult::default()
        },
    }
}
