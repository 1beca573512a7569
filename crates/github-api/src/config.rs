//! Parameters of the `github_api` action.
//!
//! [`GithubApiParams`] can be deserialized, built in code with the `with_*` methods, or read from
//! the `FL_GITHUB_API_*` environment. Explicit values win over the environment.

use crate::error::{GithubApiError, Result};
use lanekit_env::{env_string_with, parse_bool, process_env};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_SERVER_URL: &str = "https://api.github.com";

pub const ENV_SERVER_URL: &str = "FL_GITHUB_API_SERVER_URL";
pub const ENV_API_TOKEN: &str = "FL_GITHUB_API_TOKEN";
pub const ENV_FALLBACK_API_TOKEN: &str = "GITHUB_API_TOKEN";
pub const ENV_HTTP_METHOD: &str = "FL_GITHUB_API_HTTP_METHOD";
pub const ENV_REQUEST_BODY: &str = "FL_GITHUB_API_REQUEST_BODY";
pub const ENV_PATH: &str = "FL_GITHUB_API_PATH";
pub const ENV_SECURE: &str = "FL_GITHUB_API_SECURE";
pub const ENV_DEBUG: &str = "FL_GITHUB_API_DEBUG";

/// Parameters of a single `github_api` call.
#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubApiParams {
    /// API root, e.g. `https://your.internal.github.host/api/v3`.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Personal API token. Sent as `Authorization: Basic base64(token)`.
    #[serde(default, skip_serializing)]
    pub api_token: Option<String>,

    /// Case-insensitive; validated against [`HttpMethod`].
    #[serde(default = "default_http_method")]
    pub http_method: String,

    /// Endpoint path joined onto `server_url`, e.g. `repos/:owner/:repo/readme`.
    #[serde(default)]
    pub path: Option<String>,

    /// Full URL override; takes precedence over `server_url` + `path`.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub body: Option<RequestBody>,

    /// Sent verbatim, without JSON validation. Takes precedence over `body`.
    #[serde(default)]
    pub raw_body: Option<String>,

    /// Extra headers. These override defaults, including `Authorization`.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Verify TLS certificates.
    #[serde(default = "default_true")]
    pub secure: bool,

    /// Log request and response details.
    #[serde(default)]
    pub debug: bool,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_http_method() -> String {
    HttpMethod::Get.as_str().to_string()
}

fn default_true() -> bool {
    true
}

impl Default for GithubApiParams {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            api_token: None,
            http_method: default_http_method(),
            path: None,
            url: None,
            body: None,
            raw_body: None,
            headers: BTreeMap::new(),
            secure: true,
            debug: false,
        }
    }
}

impl fmt::Debug for GithubApiParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubApiParams")
            .field("server_url", &self.server_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("http_method", &self.http_method)
            .field("path", &self.path)
            .field("url", &self.url)
            .field("body", &self.body)
            .field("raw_body", &self.raw_body)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("secure", &self.secure)
            .field("debug", &self.debug)
            .finish()
    }
}

impl GithubApiParams {
    /// Defaults overlaid with the `FL_GITHUB_API_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a boolean variable holds something other than a boolean.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(process_env)
    }

    /// Like [`GithubApiParams::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if a boolean variable holds something other than a boolean.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut params = Self::default();

        if let Some(v) = env_string_with(&lookup, ENV_SERVER_URL) {
            params.server_url = v;
        }
        params.api_token = env_string_with(&lookup, ENV_API_TOKEN)
            .or_else(|| env_string_with(&lookup, ENV_FALLBACK_API_TOKEN));
        if let Some(v) = env_string_with(&lookup, ENV_HTTP_METHOD) {
            params.http_method = v;
        }
        params.body = env_string_with(&lookup, ENV_REQUEST_BODY).map(RequestBody::Text);
        params.path = env_string_with(&lookup, ENV_PATH);
        params.secure = env_bool_flag(&lookup, ENV_SECURE)?.unwrap_or(true);
        params.debug = env_bool_flag(&lookup, ENV_DEBUG)?.unwrap_or(false);

        Ok(params)
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    #[must_use]
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.http_method = method.into();
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_raw_body(mut self, raw: impl Into<String>) -> Self {
        self.raw_body = Some(raw.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Checks that can fail without looking at the request target.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `server_url` lacks a protocol while no full `url` is
    /// given, or if the HTTP method is not supported.
    pub fn validate(&self) -> Result<HttpMethod> {
        if self.url.is_none() && !self.server_url.contains("//") {
            return Err(GithubApiError::Config(
                "Please include the protocol in the server url, e.g. https://your.github.server/api/v3"
                    .to_string(),
            ));
        }
        self.http_method.parse()
    }
}

fn env_bool_flag(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<bool>> {
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    parse_bool(&raw)
        .map(Some)
        .ok_or_else(|| GithubApiError::Config(format!("{name} must be a boolean, got '{raw}'")))
}

/// Request body as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    /// Pre-encoded JSON text. Must parse as JSON; it is sent unchanged.
    Text(String),
    /// Structured value, serialized to JSON on send.
    Structured(Value),
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s),
            other => Self::Structured(other),
        }
    }
}

impl From<String> for RequestBody {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for RequestBody {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Methods the action accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Connect,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 6] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Connect,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Connect => "CONNECT",
        }
    }

    #[must_use]
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Connect => reqwest::Method::CONNECT,
        }
    }
}

impl FromStr for HttpMethod {
    type Err = GithubApiError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == upper)
            .ok_or_else(|| GithubApiError::Config("Unrecognised HTTP method".to_string()))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
