//! Self-description of the action, as shown by `lanekit actions`.

use crate::action::shared_values;
use crate::config::{
    DEFAULT_SERVER_URL, ENV_API_TOKEN, ENV_DEBUG, ENV_HTTP_METHOD, ENV_PATH, ENV_REQUEST_BODY,
    ENV_SECURE, ENV_SERVER_URL,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionInfo {
    pub key: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_name: Option<&'static str>,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<&'static str>,
    pub optional: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputInfo {
    pub key: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub details: &'static str,
    pub category: &'static str,
    pub authors: Vec<&'static str>,
    pub options: Vec<OptionInfo>,
    pub outputs: Vec<OutputInfo>,
    pub return_value: &'static str,
}

const fn option(
    key: &'static str,
    env_name: Option<&'static str>,
    description: &'static str,
    default_value: Option<&'static str>,
    optional: bool,
) -> OptionInfo {
    OptionInfo {
        key,
        env_name,
        description,
        default_value,
        optional,
        sensitive: false,
    }
}

#[must_use]
pub fn github_api_info() -> ActionInfo {
    ActionInfo {
        name: "github_api",
        description: "Call a GitHub API endpoint and get the resulting JSON response",
        details: "Calls any GitHub API endpoint. You must provide your GitHub personal token. \
                  Outputs provide the status code, the full response and the parsed JSON if \
                  the body was valid JSON.",
        category: "source_control",
        authors: vec!["lanekit contributors"],
        options: vec![
            option(
                "server_url",
                Some(ENV_SERVER_URL),
                "The server url, e.g. 'https://your.internal.github.host/api/v3'",
                Some(DEFAULT_SERVER_URL),
                true,
            ),
            OptionInfo {
                sensitive: true,
                ..option(
                    "api_token",
                    Some(ENV_API_TOKEN),
                    "Personal API token for GitHub (falls back to GITHUB_API_TOKEN)",
                    None,
                    false,
                )
            },
            option(
                "http_method",
                Some(ENV_HTTP_METHOD),
                "The HTTP method: GET, POST, PUT, DELETE, HEAD or CONNECT",
                Some("GET"),
                true,
            ),
            option(
                "body",
                Some(ENV_REQUEST_BODY),
                "The request body as JSON text or a structured value",
                Some("{}"),
                true,
            ),
            option(
                "raw_body",
                None,
                "The request body sent as-is, without JSON validation",
                None,
                true,
            ),
            option(
                "path",
                Some(ENV_PATH),
                "The endpoint path, e.g. '/repos/:owner/:repo/readme'",
                None,
                true,
            ),
            option(
                "url",
                None,
                "The complete full url; used instead of server_url + path",
                None,
                true,
            ),
            option(
                "headers",
                None,
                "Headers to send; these override the defaults, including Authorization",
                None,
                true,
            ),
            option(
                "errors",
                None,
                "Error handlers by status code, or '*' to handle all other errors",
                None,
                true,
            ),
            option(
                "secure",
                Some(ENV_SECURE),
                "Set to false to disable TLS certificate verification",
                Some("true"),
                true,
            ),
            option(
                "debug",
                Some(ENV_DEBUG),
                "Log request and response details",
                Some("false"),
                true,
            ),
        ],
        outputs: vec![
            OutputInfo {
                key: shared_values::GITHUB_API_STATUS_CODE,
                description: "The status code returned from the request",
            },
            OutputInfo {
                key: shared_values::GITHUB_API_RESPONSE,
                description: "The full response (status, final url, headers, body)",
            },
            OutputInfo {
                key: shared_values::GITHUB_API_JSON,
                description: "The parsed JSON returned from GitHub",
            },
        ],
        return_value: "The HTTP status code, the full response and the parsed JSON (or an \
                       empty object if the body was not valid JSON)",
    }
}
