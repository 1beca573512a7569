use crate::error::UsageError;
use crate::marker;
use crate::report::{PendingReport, build_report_url, dispatch_detached};
use crate::settings::{CollectorSettings, Dispatch};
use crate::tools::is_official;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Default)]
struct Counters {
    launches: BTreeMap<String, u64>,
    error: Option<String>,
}

/// Slack on top of the send timeout when waiting for the report thread.
const WAIT_MARGIN: Duration = Duration::from_millis(500);

/// Per-process usage counters. Create one, share it behind an `Arc` if needed, and call
/// [`ToolCollector::did_finish`] then [`ToolCollector::wait_for_report`] once on the way out.
#[derive(Debug)]
pub struct ToolCollector {
    settings: CollectorSettings,
    counters: Mutex<Counters>,
    pending: Mutex<Option<PendingReport>>,
}

impl Default for ToolCollector {
    fn default() -> Self {
        Self::new(CollectorSettings::from_env())
    }
}

impl ToolCollector {
    #[must_use]
    pub fn new(settings: CollectorSettings) -> Self {
        Self {
            settings,
            counters: Mutex::new(Counters::default()),
            pending: Mutex::new(None),
        }
    }

    /// Count a launch of `name`. Unofficial names are ignored.
    pub fn did_launch_action(&self, name: &str) {
        if is_official(name) {
            *self
                .counters
                .lock()
                .launches
                .entry(name.to_string())
                .or_insert(0) += 1;
        }
    }

    /// Remember `name` as the last tool that failed. Unofficial names are ignored.
    pub fn did_raise_error(&self, name: &str) {
        if is_official(name) {
            self.counters.lock().error = Some(name.to_string());
        }
    }

    #[must_use]
    pub fn launches(&self) -> BTreeMap<String, u64> {
        self.counters.lock().launches.clone()
    }

    #[must_use]
    pub fn launch_count(&self, name: &str) -> Option<u64> {
        self.counters.lock().launches.get(name).copied()
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.counters.lock().error.clone()
    }

    /// Report the collected data.
    ///
    /// Returns the report URL in dry-run mode and `None` otherwise (including when opted out or
    /// when anything went wrong, which is never surfaced).
    pub fn did_finish(&self) -> Option<Url> {
        if self.settings.opt_out {
            debug!("usage reporting opted out");
            return None;
        }

        match self.report() {
            Ok(url) => url,
            Err(e) => {
                debug!(error = %e, "usage report suppressed");
                None
            }
        }
    }

    fn report(&self) -> Result<Option<Url>, UsageError> {
        let (launches, error) = {
            let counters = self.counters.lock();
            (counters.launches.clone(), counters.error.clone())
        };

        let home = self.settings.home_dir.as_deref().ok_or(UsageError::NoHome)?;
        let did_show = marker::did_show_message(home)?;
        if !did_show && !self.settings.on_ci {
            self.disclose(&launches, error.as_deref())?;
        }

        let url = build_report_url(&self.settings.host_url, &launches, error.as_deref())?;

        match self.settings.dispatch {
            Dispatch::DryRun => Ok(Some(url)),
            Dispatch::Background => {
                let pending = dispatch_detached(url, self.settings.send_timeout)?;
                *self.pending.lock() = Some(pending);
                Ok(None)
            }
        }
    }

    /// Hold the caller until a report started by [`ToolCollector::did_finish`] has been sent,
    /// bounded by the send timeout. The report thread does not outlive the process, so call this
    /// before exiting. Returns `true` if a report was pending and finished in time.
    pub fn wait_for_report(&self) -> bool {
        let Some(pending) = self.pending.lock().take() else {
            return false;
        };
        let finished = pending.wait(self.settings.send_timeout + WAIT_MARGIN);
        if !finished {
            debug!("usage report still in flight, not waiting any longer");
        }
        finished
    }

    fn disclose(
        &self,
        launches: &BTreeMap<String, u64>,
        error: Option<&str>,
    ) -> Result<(), UsageError> {
        info!("Sending crash/success information to {}", self.settings.host_url);
        info!("No personal/sensitive data is sent. Only sharing the following:");
        info!("{}", serde_json::to_string(launches)?);
        if let Some(error) = error {
            info!("{error}");
        }
        info!("This information is used to fix failing actions and improve integrations that are often used.");
        info!(
            "You can disable this by setting the {} environment variable",
            crate::settings::ENV_OPT_OUT
        );
        Ok(())
    }
}
