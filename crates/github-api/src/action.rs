//! Runtime for the `github_api` action.

use crate::config::{GithubApiParams, HttpMethod};
use crate::error::{GithubApiError, Result};
use crate::handlers::ErrorHandlers;
use crate::redact::{redact_headers, redact_url};
use crate::request::{build_headers, encode_body, resolve_url};
use crate::response::{ApiResult, RawResponse};
use lanekit_lane::LaneContext;
use reqwest::Client;
use reqwest::header::HeaderMap;
use tracing::{error, info};
use url::Url;

/// Renamed repositories answer with a redirect; follow a bounded number of hops.
const MAX_REDIRECTS: usize = 10;

/// Keys under which every call publishes its outcome to the lane context.
pub mod shared_values {
    /// `u16` status code of the last call.
    pub const GITHUB_API_STATUS_CODE: &str = "GITHUB_API_STATUS_CODE";
    /// [`crate::RawResponse`] of the last call.
    pub const GITHUB_API_RESPONSE: &str = "GITHUB_API_RESPONSE";
    /// `serde_json::Value` body of the last call (`{}` if not JSON).
    pub const GITHUB_API_JSON: &str = "GITHUB_API_JSON";
}

/// Tool this action belongs to, for usage reporting.
pub const OWNING_TOOL: &str = "fastlane";

pub struct GithubApiAction {
    params: GithubApiParams,
    handlers: ErrorHandlers,
}

struct PreparedRequest {
    method: HttpMethod,
    url: Url,
    headers: HeaderMap,
    body: String,
}

impl GithubApiAction {
    #[must_use]
    pub fn new(params: GithubApiParams) -> Self {
        Self {
            params,
            handlers: ErrorHandlers::default(),
        }
    }

    #[must_use]
    pub fn with_error_handlers(mut self, handlers: ErrorHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// Perform the call and publish the outcome to `lane`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the parameters are invalid (URL, method, body, headers)
    /// - the request cannot be sent
    /// - the response is non-2xx and no error handler matches
    /// - a matching error handler fails
    pub async fn run(&self, lane: &mut LaneContext) -> Result<ApiResult> {
        self.run_with(lane, |_| Ok(())).await
    }

    /// Like [`GithubApiAction::run`], invoking `on_success` once for a 2xx response.
    ///
    /// # Errors
    ///
    /// Same as [`GithubApiAction::run`], plus any error returned by `on_success`.
    pub async fn run_with<F>(&self, lane: &mut LaneContext, on_success: F) -> Result<ApiResult>
    where
        F: FnOnce(&ApiResult) -> anyhow::Result<()>,
    {
        // Everything that can be rejected locally is rejected before any network I/O.
        let request = self.prepare()?;
        let client = build_client(self.params.secure)?;

        info!("{} : {}", request.method, redact_url(&request.url));
        if self.params.debug {
            info!(
                method = %request.method,
                url = %request.url,
                headers = ?redact_headers(&request.headers),
                body = %request.body,
                "github_api request"
            );
        }

        let response = client
            .request(request.method.to_reqwest(), request.url.clone())
            .headers(request.headers.clone())
            .body(request.body.clone())
            .send()
            .await?;
        let result = ApiResult::new(RawResponse::read(response).await?);

        publish(lane, &result);

        if result.is_success() {
            if self.params.debug {
                info!(
                    status = result.status,
                    body = %result.response.body,
                    "github_api response"
                );
            }
            on_success(&result)?;
            return Ok(result);
        }

        if let Some((key, handler)) = self.handlers.resolve(result.status) {
            info!(status = result.status, handler = %key, "github_api error handled by caller");
            handler(&result)?;
            return Ok(result);
        }

        let headers = redact_headers(&request.headers);
        error!(
            method = %request.method,
            url = %redact_url(&request.url),
            headers = ?headers,
            status = result.status,
            body = %result.response.body,
            "github_api request failed"
        );
        Err(GithubApiError::Status {
            method: request.method.to_string(),
            url: request.url.to_string(),
            headers,
            status: result.status,
            body: result.response.body,
        })
    }

    fn prepare(&self) -> Result<PreparedRequest> {
        let method = self.params.validate()?;
        let url = resolve_url(&self.params)?;
        let headers = build_headers(&self.params)?;
        let body = encode_body(&self.params)?;
        Ok(PreparedRequest {
            method,
            url,
            headers,
            body,
        })
    }
}

/// A client per call, so TLS strictness never leaks between calls.
fn build_client(secure: bool) -> Result<Client> {
    Client::builder()
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .danger_accept_invalid_certs(!secure)
        .build()
        .map_err(GithubApiError::from)
}

fn publish(lane: &mut LaneContext, result: &ApiResult) {
    lane.set(shared_values::GITHUB_API_STATUS_CODE, result.status);
    lane.set(shared_values::GITHUB_API_RESPONSE, result.response.clone());
    lane.set(shared_values::GITHUB_API_JSON, result.json.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn invalid_text_body_fails_before_any_request() {
        // Port 9 (discard) is never contacted: preparation fails first.
        let action = GithubApiAction::new(
            GithubApiParams::default()
                .with_url("http://127.0.0.1:9/never")
                .with_method("POST")
                .with_body("{not json"),
        );
        let mut lane = LaneContext::new();

        let err = action.run(&mut lane).await.unwrap_err();
        assert!(matches!(err, GithubApiError::Config(_)));
        assert!(lane.is_empty());
    }

    #[tokio::test]
    async fn unknown_method_is_rejected() {
        let action = GithubApiAction::new(
            GithubApiParams::default()
                .with_path("repos/a/b")
                .with_method("PATCH"),
        );
        let err = action.run(&mut LaneContext::new()).await.unwrap_err();
        assert!(err.to_string().contains("Unrecognised HTTP method"));
    }

    #[tokio::test]
    async fn missing_path_and_url_is_rejected() {
        let action = GithubApiAction::new(
            GithubApiParams::default()
                .with_method("PUT")
                .with_body(json!({})),
        );
        let err = action.run(&mut LaneContext::new()).await.unwrap_err();
        assert!(
            err.to_string()
                .contains("Please provide either 'path' or full 'url' for github api endpoint")
        );
    }

    #[test]
    fn insecure_client_builds() {
        build_client(false).expect("insecure client");
        build_client(true).expect("secure client");
    }
}
