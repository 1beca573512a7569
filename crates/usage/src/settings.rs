use lanekit_env::{
    env_flag_with, env_present_with, env_string_with, home_dir_with, is_ci_with, process_env,
};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_HOST_URL: &str = "https://lanekit-enhancer.herokuapp.com";

/// Any value disables reporting.
pub const ENV_OPT_OUT: &str = "LANEKIT_OPT_OUT_USAGE";
/// Build the report but never send it.
pub const ENV_DRY_RUN: &str = "LANEKIT_USAGE_DRY_RUN";
/// Alternative report endpoint.
pub const ENV_HOST_URL: &str = "LANEKIT_USAGE_HOST_URL";

const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// POST from a background thread; see [`crate::ToolCollector::wait_for_report`].
    Background,
    /// Return the report URL instead of sending it.
    DryRun,
}

#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub opt_out: bool,
    pub dispatch: Dispatch,
    /// Suppresses the first-run disclosure.
    pub on_ci: bool,
    /// Where the disclosure marker lives.
    pub home_dir: Option<PathBuf>,
    pub host_url: String,
    pub send_timeout: Duration,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            opt_out: false,
            dispatch: Dispatch::Background,
            on_ci: false,
            home_dir: None,
            host_url: DEFAULT_HOST_URL.to_string(),
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }
}

impl CollectorSettings {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(process_env)
    }

    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            opt_out: env_present_with(&lookup, ENV_OPT_OUT),
            dispatch: if env_flag_with(&lookup, ENV_DRY_RUN) {
                Dispatch::DryRun
            } else {
                Dispatch::Background
            },
            on_ci: is_ci_with(&lookup),
            home_dir: home_dir_with(&lookup),
            host_url: env_string_with(&lookup, ENV_HOST_URL)
                .unwrap_or_else(|| DEFAULT_HOST_URL.to_string()),
            ..Self::default()
        }
    }

    /// Dry-run settings rooted at `home`, for tests.
    #[must_use]
    pub fn dry_run(home: impl Into<PathBuf>) -> Self {
        Self {
            dispatch: Dispatch::DryRun,
            home_dir: Some(home.into()),
            ..Self::default()
        }
    }
}
