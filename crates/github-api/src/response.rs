//! What the action hands back: the raw transport response plus its status and parsed body.

use reqwest::header::HeaderMap;
use serde_json::{Map, Value};
use url::Url;

/// The transport response, captured once the body has been read.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// Final URL after redirects.
    pub url: Url,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    pub(crate) async fn read(response: reqwest::Response) -> crate::Result<Self> {
        let status = response.status().as_u16();
        let url = response.url().clone();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;
        Ok(Self {
            status,
            url,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// Outcome of a call, handed to callbacks and returned to the caller.
#[derive(Debug, Clone)]
pub struct ApiResult {
    pub status: u16,
    pub response: RawResponse,
    /// Parsed body, or an empty object when the body is empty or not JSON.
    pub json: Value,
}

impl ApiResult {
    #[must_use]
    pub fn new(response: RawResponse) -> Self {
        Self {
            status: response.status,
            json: parse_json_or_empty(&response.body),
            response,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

#[must_use]
pub fn parse_json_or_empty(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::Object(Map::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            url: Url::parse("https://api.github.com/x").expect("url"),
            headers: HeaderMap::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn json_body_is_parsed() {
        let result = ApiResult::new(raw(200, r#"{"message":"ok"}"#));
        assert_eq!(result.json, json!({"message": "ok"}));
        assert!(result.is_success());
    }

    #[test]
    fn empty_or_invalid_body_yields_empty_object() {
        assert_eq!(ApiResult::new(raw(204, "")).json, json!({}));
        assert_eq!(ApiResult::new(raw(502, "<html>bad gateway</html>")).json, json!({}));
    }

    #[test]
    fn success_range_is_inclusive() {
        assert!(ApiResult::new(raw(200, "")).is_success());
        assert!(ApiResult::new(raw(299, "")).is_success());
        assert!(!ApiResult::new(raw(199, "")).is_success());
        assert!(!ApiResult::new(raw(300, "")).is_success());
    }
}
