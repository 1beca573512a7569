//! Request assembly: target URL, headers and body.

use crate::config::{GithubApiParams, RequestBody};
use crate::error::{GithubApiError, Result};
use base64::Engine as _;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde_json::Value;
use url::Url;

/// Sent on every request so the API can identify the caller.
pub const USER_AGENT_VALUE: &str = "lanekit-github_api";

/// Resolve the request target. An explicit `url` wins over `server_url` + `path`.
///
/// # Errors
///
/// Returns a configuration error if neither is given or the result is not a valid URL.
pub fn resolve_url(params: &GithubApiParams) -> Result<Url> {
    let raw = match (params.url.as_deref(), params.path.as_deref()) {
        (Some(url), _) if !url.trim().is_empty() => url.trim().to_string(),
        (_, Some(path)) if !path.trim().is_empty() => join_path(&params.server_url, path.trim()),
        _ => {
            return Err(GithubApiError::Config(
                "Please provide either 'path' or full 'url' for github api endpoint".to_string(),
            ));
        }
    };

    Url::parse(&raw).map_err(|e| GithubApiError::Config(format!("Invalid URL '{raw}': {e}")))
}

/// Join with exactly one `/` between server and path.
fn join_path(server_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        server_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// `Basic base64(token)`. Only the bare token is encoded; there is no `user:` prefix.
#[must_use]
pub fn basic_auth_value(token: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(token);
    format!("Basic {encoded}")
}

/// Default headers overlaid with caller headers. Header names are case-insensitive, so a caller
/// `authorization` replaces the default `Authorization`.
///
/// # Errors
///
/// Returns a configuration error for invalid header names or values.
pub fn build_headers(params: &GithubApiParams) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

    if let Some(token) = params.api_token.as_deref() {
        let value = HeaderValue::from_str(&basic_auth_value(token)).map_err(|_| {
            GithubApiError::Config("API token contains characters not allowed in a header".into())
        })?;
        headers.insert(AUTHORIZATION, value);
    }

    for (name, value) in &params.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| GithubApiError::Config(format!("Invalid header name '{name}': {e}")))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            GithubApiError::Config(format!("Invalid value for header '{name}': {e}"))
        })?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

/// Encode the outgoing body. `raw_body` is sent untouched; structured bodies are JSON-encoded;
/// text bodies must parse as JSON. No body at all encodes as `{}`.
///
/// # Errors
///
/// Returns a configuration error if a text body is not valid JSON.
pub fn encode_body(params: &GithubApiParams) -> Result<String> {
    if let Some(raw) = &params.raw_body {
        return Ok(raw.clone());
    }

    match &params.body {
        None => Ok("{}".to_string()),
        Some(RequestBody::Structured(value)) => serde_json::to_string(value)
            .map_err(|e| GithubApiError::Config(format!("Unable to encode request body: {e}"))),
        Some(RequestBody::Text(text)) => {
            if serde_json::from_str::<Value>(text).is_err() {
                return Err(GithubApiError::Config(
                    "Please provide valid JSON, or a hash as request body".to_string(),
                ));
            }
            Ok(text.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params() -> GithubApiParams {
        GithubApiParams::default()
    }

    #[test]
    fn path_is_joined_onto_server_url_with_single_slash() {
        for (server, path) in [
            ("https://api.github.com", "repos/a/b"),
            ("https://api.github.com/", "/repos/a/b"),
            ("https://api.github.com", "/repos/a/b"),
        ] {
            let url = resolve_url(&params().with_server_url(server).with_path(path)).expect("url");
            assert_eq!(url.as_str(), "https://api.github.com/repos/a/b");
        }
    }

    #[test]
    fn explicit_url_overrides_path() {
        let url = resolve_url(
            &params()
                .with_path("repos/a/b")
                .with_url("https://uploads.github.com/repos/a/b/releases/1/assets?name=x.md"),
        )
        .expect("url");
        assert_eq!(url.host_str(), Some("uploads.github.com"));
        assert_eq!(url.query(), Some("name=x.md"));
    }

    #[test]
    fn missing_target_is_a_configuration_error() {
        let err = resolve_url(&params()).unwrap_err();
        assert!(matches!(err, GithubApiError::Config(_)));
        assert!(
            err.to_string()
                .contains("Please provide either 'path' or full 'url' for github api endpoint")
        );
    }

    #[test]
    fn token_alone_is_base64_encoded() {
        assert_eq!(basic_auth_value("123456789"), "Basic MTIzNDU2Nzg5");
    }

    #[test]
    fn default_headers_include_user_agent_and_auth() {
        let headers = build_headers(&params().with_api_token("123456789")).expect("headers");
        assert_eq!(headers[USER_AGENT], USER_AGENT_VALUE);
        assert_eq!(headers[AUTHORIZATION], "Basic MTIzNDU2Nzg5");
    }

    #[test]
    fn caller_headers_override_defaults_case_insensitively() {
        let headers = build_headers(
            &params()
                .with_api_token("123456789")
                .with_header("authorization", "custom")
                .with_header("Content-Type", "text/plain"),
        )
        .expect("headers");
        assert_eq!(headers.get_all(AUTHORIZATION).iter().count(), 1);
        assert_eq!(headers[AUTHORIZATION], "custom");
        assert_eq!(headers["content-type"], "text/plain");
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let err = build_headers(&params().with_header("bad header", "x")).unwrap_err();
        assert!(matches!(err, GithubApiError::Config(_)));
    }

    #[test]
    fn structured_body_is_json_encoded() {
        let body = encode_body(&params().with_body(json!({"ref": "master"}))).expect("body");
        assert_eq!(body, r#"{"ref":"master"}"#);
    }

    #[test]
    fn text_body_must_be_valid_json_and_is_sent_unchanged() {
        let text = "{\n  \"path\": \"TEST_FILE.md\"\n}";
        assert_eq!(encode_body(&params().with_body(text)).expect("body"), text);

        let err = encode_body(&params().with_body("not json")).unwrap_err();
        assert!(
            err.to_string()
                .contains("Please provide valid JSON, or a hash as request body")
        );
    }

    #[test]
    fn raw_body_skips_validation_and_wins_over_body() {
        let body = encode_body(
            &params()
                .with_body(json!({"ignored": true}))
                .with_raw_body("test raw content of file"),
        )
        .expect("body");
        assert_eq!(body, "test raw content of file");
    }

    #[test]
    fn absent_body_encodes_as_empty_object() {
        assert_eq!(encode_body(&params()).expect("body"), "{}");
    }
}
