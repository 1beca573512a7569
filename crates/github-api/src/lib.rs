//! The `github_api` action.
//!
//! Calls a single GitHub REST endpoint, classifies the response by status code and publishes the
//! outcome to the lane context. Error routing is caller-supplied per call via [`ErrorHandlers`].
//!
//! It intentionally contains **no** retry or pagination logic.

pub mod action;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metadata;
pub mod redact;
pub mod request;
pub mod response;

pub use action::{GithubApiAction, shared_values};
pub use config::{GithubApiParams, HttpMethod, RequestBody};
pub use error::{GithubApiError, Result};
pub use handlers::{ErrorHandler, ErrorHandlers, HandlerKey};
pub use response::{ApiResult, RawResponse};
