use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::request::PreparedRequest;
use super::response::HttpResponse;

pub fn build_client(timeout: Option<Duration>) -> Result<Client, String> {
    let mut builder = Client::builder().redirect(reqwest::redirect::Policy::limited(10));

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|err| format!("Failed to build HTTP client: {err}"))
}

pub fn build_headers<'a>(
    input: impl IntoIterator<Item = (&'a String, &'a String)>,
) -> Result<HeaderMap, String> {
    let mut headers = HeaderMap::new();

    for (key, value) in input {
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        let header_name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|err| format!("Invalid header name `{key}`: {err}"))?;
        let header_value = HeaderValue::from_str(value.trim())
            .map_err(|err| format!("Invalid header value for `{key}`: {err}"))?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

pub async fn send_request(client: &Client, request: &PreparedRequest) -> Result<HttpResponse, String> {
    let mut req_builder = client
        .request(request.method.into(), request.url.clone())
        .headers(request.headers.clone());

    if let Some(body) = &request.body {
        if request.method.allows_body() {
            req_builder = req_builder.body(body.clone());
        }
    }

    let started = Instant::now();
    let response = req_builder
        .send()
        .await
        .map_err(|err| format!("Request failed: {err}"))?;

    let status = response.status();
    let headers = collect_headers(response.headers());
    let bytes = response
        .bytes()
        .await
        .map_err(|err| format!("Failed to read response: {err}"))?;
    let elapsed = started.elapsed().as_millis() as u64;

    Ok(HttpResponse {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
        headers,
        size_bytes: bytes.len(),
        body: String::from_utf8_lossy(&bytes).into_owned(),
        duration_ms: elapsed,
    })
}

fn collect_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut collected: HashMap<String, String> = HashMap::new();
    for (name, value) in headers {
        let value = value.to_str().unwrap_or("<binary>");
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    collected
}
