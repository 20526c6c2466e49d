//! The declarative shape of a test as understood by the HTTP builder, and the
//! resolution of templates and variables into ready-to-send requests.

use std::collections::{BTreeMap, HashMap};

use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::environment::{interpolate, interpolate_value};
use crate::http::client::build_headers;
use crate::http::method::HttpMethod;
use crate::http::request::PreparedRequest;
use crate::testing::validation::Validation;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDefinition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub setup_and_teardown: Option<String>,
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDefinition {
    #[serde(default)]
    pub name: Option<String>,
    pub request: RequestDefinition,
    #[serde(default)]
    pub response: ResponseDefinition,
}

/// A request, possibly partial. Anything left out is taken from the named
/// request template.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDefinition {
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDefinition {
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub validations: Vec<Validation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupAndTeardown {
    #[serde(default)]
    pub setup: Vec<StepDefinition>,
    #[serde(default)]
    pub teardown: Vec<StepDefinition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Main,
    Teardown,
}

/// A step ready to execute: no templates, no placeholders.
#[derive(Debug, Clone)]
pub struct PreparedStep {
    pub name: String,
    pub phase: Phase,
    pub request: PreparedRequest,
    pub validations: Vec<Validation>,
}

impl RequestDefinition {
    /// Overlay `self` on `base`: scalar fields from `self` win and headers are
    /// merged key by key.
    fn merged_over(self, base: RequestDefinition) -> RequestDefinition {
        let mut headers = normalized_headers(base.headers);
        headers.extend(normalized_headers(self.headers));

        RequestDefinition {
            template: None,
            method: self.method.or(base.method),
            url: self.url.or(base.url),
            headers,
            body: self.body.or(base.body),
        }
    }
}

/// Header names compare case-insensitively; keying on the lowercase name lets
/// a step override a template header however either one spells it.
fn normalized_headers(headers: BTreeMap<String, String>) -> BTreeMap<String, String> {
    headers
        .into_iter()
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value))
        .collect()
}

/// Everything needed to turn step definitions into prepared steps.
pub struct Resolver<'a> {
    pub request_templates: &'a Map<String, Value>,
    pub response_templates: &'a Map<String, Value>,
    pub variables: HashMap<String, String>,
    pub base_url: Option<&'a str>,
}

impl Resolver<'_> {
    pub fn prepare(&self, step: StepDefinition, phase: Phase, position: usize) -> Result<PreparedStep, String> {
        let name = step
            .name
            .clone()
            .unwrap_or_else(|| format!("{} step {}", phase_label(phase), position + 1));

        let request = self
            .resolve_request(step.request)
            .and_then(|request| self.prepare_request(request))
            .map_err(|err| format!("{name}: {err}"))?;

        let validations = self
            .resolve_validations(step.response)
            .map_err(|err| format!("{name}: {err}"))?;

        Ok(PreparedStep {
            name,
            phase,
            request,
            validations,
        })
    }

    fn resolve_request(&self, mut request: RequestDefinition) -> Result<RequestDefinition, String> {
        let Some(template_name) = request.template.take() else {
            return Ok(request);
        };

        let template = self
            .request_templates
            .get(&template_name)
            .ok_or_else(|| format!("unknown request template `{template_name}`"))?;
        let template: RequestDefinition = serde_json::from_value(template.clone())
            .map_err(|err| format!("invalid request template `{template_name}`: {err}"))?;

        Ok(request.merged_over(template))
    }

    fn resolve_validations(&self, response: ResponseDefinition) -> Result<Vec<Validation>, String> {
        let Some(template_name) = response.template else {
            return Ok(response.validations);
        };

        let template = self
            .response_templates
            .get(&template_name)
            .ok_or_else(|| format!("unknown response template `{template_name}`"))?;
        let template: ResponseDefinition = serde_json::from_value(template.clone())
            .map_err(|err| format!("invalid response template `{template_name}`: {err}"))?;

        let mut validations = template.validations;
        validations.extend(response.validations);
        Ok(validations)
    }

    fn prepare_request(&self, request: RequestDefinition) -> Result<PreparedRequest, String> {
        let method = match request.method.as_deref() {
            Some(method) => method.parse::<HttpMethod>()?,
            None => HttpMethod::Get,
        };

        let raw_url = request.url.ok_or_else(|| "request has no url".to_string())?;
        let url = self.resolve_url(&interpolate(&raw_url, &self.variables))?;

        let headers: BTreeMap<String, String> = request
            .headers
            .iter()
            .map(|(key, value)| (interpolate(key, &self.variables), interpolate(value, &self.variables)))
            .collect();
        let mut headers = build_headers(&headers)?;

        let body = match request.body.map(|body| interpolate_value(&body, &self.variables)) {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text),
            Some(json) => {
                if method.allows_body() && !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
                Some(json.to_string())
            }
        };

        Ok(PreparedRequest {
            method,
            url,
            headers,
            body,
        })
    }

    fn resolve_url(&self, raw: &str) -> Result<Url, String> {
        let raw = raw.trim();
        match (Url::parse(raw), self.base_url) {
            (Ok(url), _) => Ok(url),
            (Err(_), Some(base)) if !raw.contains("://") => {
                let joined = format!("{}/{}", base.trim_end_matches('/'), raw.trim_start_matches('/'));
                Url::parse(&joined).map_err(|err| format!("Invalid URL `{joined}`: {err}"))
            }
            (Err(err), _) => Err(format!("Invalid URL `{raw}`: {err}")),
        }
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Setup => "setup",
        Phase::Main => "test",
        Phase::Teardown => "teardown",
    }
}
