use reqwest::Url;
use reqwest::header::HeaderMap;

use super::method::HttpMethod;

/// A fully resolved request: templates merged, variables substituted and
/// every part validated.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}
