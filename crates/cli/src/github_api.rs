use anyhow::Context as _;
use clap::Args;
use lanekit_github_api::{
    ApiResult, ErrorHandlers, GithubApiAction, GithubApiParams, HandlerKey, RequestBody,
};
use lanekit_lane::LaneContext;
use serde_json::json;
use tracing::warn;

#[derive(Debug, Args)]
pub struct GithubApiArgs {
    /// API root, e.g. https://your.internal.github.host/api/v3 [env: FL_GITHUB_API_SERVER_URL]
    #[arg(long)]
    pub server_url: Option<String>,

    /// Personal API token [env: FL_GITHUB_API_TOKEN, GITHUB_API_TOKEN]
    #[arg(long)]
    pub api_token: Option<String>,

    /// GET, POST, PUT, DELETE, HEAD or CONNECT [env: FL_GITHUB_API_HTTP_METHOD]
    #[arg(long)]
    pub http_method: Option<String>,

    /// Endpoint path, e.g. repos/:owner/:repo/readme [env: FL_GITHUB_API_PATH]
    #[arg(long)]
    pub path: Option<String>,

    /// Full URL; used instead of server URL + path
    #[arg(long)]
    pub url: Option<String>,

    /// JSON request body [env: FL_GITHUB_API_REQUEST_BODY]
    #[arg(long, conflicts_with = "raw_body")]
    pub body: Option<String>,

    /// Request body sent as-is
    #[arg(long)]
    pub raw_body: Option<String>,

    /// Extra header as NAME=VALUE (repeatable); overrides defaults
    #[arg(long = "header", value_name = "NAME=VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Do not verify TLS certificates [env: FL_GITHUB_API_SECURE=false]
    #[arg(long)]
    pub insecure: bool,

    /// Log request and response details [env: FL_GITHUB_API_DEBUG]
    #[arg(long)]
    pub debug: bool,

    /// Treat this status code (or `*` for any) as handled instead of failing (repeatable)
    #[arg(long = "handle", value_name = "STATUS|*", value_parser = parse_handler_key)]
    pub handle: Vec<HandlerKey>,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn parse_handler_key(raw: &str) -> Result<HandlerKey, String> {
    raw.parse::<HandlerKey>().map_err(|e| e.to_string())
}

impl GithubApiArgs {
    /// Flags over environment over defaults.
    pub fn to_params(&self) -> anyhow::Result<GithubApiParams> {
        let mut params =
            GithubApiParams::from_env().context("read FL_GITHUB_API_* environment")?;

        if let Some(v) = &self.server_url {
            params.server_url.clone_from(v);
        }
        if let Some(v) = &self.api_token {
            params.api_token = Some(v.clone());
        }
        if let Some(v) = &self.http_method {
            params.http_method.clone_from(v);
        }
        if let Some(v) = &self.path {
            params.path = Some(v.clone());
        }
        if let Some(v) = &self.url {
            params.url = Some(v.clone());
        }
        if let Some(v) = &self.body {
            params.body = Some(RequestBody::Text(v.clone()));
        }
        if let Some(v) = &self.raw_body {
            params.raw_body = Some(v.clone());
        }
        for (name, value) in &self.headers {
            params.headers.insert(name.clone(), value.clone());
        }
        if self.insecure {
            params.secure = false;
        }
        if self.debug {
            params.debug = true;
        }

        Ok(params)
    }

    fn handlers(&self) -> ErrorHandlers {
        let mut handlers = ErrorHandlers::new();
        for key in &self.handle {
            let key = *key;
            handlers.insert(
                key,
                Box::new(move |result: &ApiResult| -> anyhow::Result<()> {
                    warn!(status = result.status, handler = %key, "request failed, continuing");
                    Ok(())
                }),
            );
        }
        handlers
    }
}

pub async fn run(args: &GithubApiArgs) -> anyhow::Result<()> {
    let params = args.to_params()?;
    let action = GithubApiAction::new(params).with_error_handlers(args.handlers());

    let mut lane = LaneContext::new();
    let result = action.run(&mut lane).await?;

    let out = json!({
        "status": result.status,
        "url": result.response.url.as_str(),
        "json": result.json,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_parser_splits_on_first_equals() {
        assert_eq!(
            parse_header("Authorization=token a=b").expect("header"),
            ("Authorization".to_string(), "token a=b".to_string())
        );
        assert!(parse_header("no-equals").is_err());
        assert!(parse_header("=value").is_err());
    }

    #[test]
    fn handler_keys_accept_codes_and_wildcard() {
        assert_eq!(parse_handler_key("404"), Ok(HandlerKey::Status(404)));
        assert_eq!(parse_handler_key("*"), Ok(HandlerKey::Wildcard));
        assert!(parse_handler_key("nope").is_err());
    }
}
