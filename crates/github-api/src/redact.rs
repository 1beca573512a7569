//! Redaction helpers for anything that ends up in logs or error messages.

use reqwest::header::{AUTHORIZATION, HeaderMap, PROXY_AUTHORIZATION};
use std::collections::BTreeMap;
use url::Url;

const REDACTED: &str = "<redacted>";

#[must_use]
pub fn redact_url(url: &Url) -> String {
    let mut u = url.clone();
    // Best-effort: drop credentials + query + fragment.
    let _ = u.set_username("");
    let _ = u.set_password(None);
    u.set_query(None);
    u.set_fragment(None);
    u.to_string()
}

#[must_use]
pub fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        msg = msg.replace(u.as_str(), &redact_url(u));
    }
    msg
}

/// Render headers for display, masking credentials.
#[must_use]
pub fn redact_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if name == AUTHORIZATION || name == PROXY_AUTHORIZATION {
                REDACTED.to_string()
            } else {
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            };
            (name.as_str().to_string(), shown)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, USER_AGENT};

    #[test]
    fn url_loses_credentials_query_and_fragment() {
        let url = Url::parse("https://user:pw@api.github.com/repos?token=abc#frag").expect("url");
        assert_eq!(redact_url(&url), "https://api.github.com/repos");
    }

    #[test]
    fn authorization_is_masked_other_headers_kept() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic MTIzNDU2Nzg5"));
        headers.insert(USER_AGENT, HeaderValue::from_static("lanekit-github_api"));

        let shown = redact_headers(&headers);
        assert_eq!(shown["authorization"], REDACTED);
        assert_eq!(shown["user-agent"], "lanekit-github_api");
    }
}
