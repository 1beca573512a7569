//! Report URL construction and fire-and-forget dispatch.

use crate::error::UsageError;
use std::collections::BTreeMap;
use std::sync::mpsc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// `{host}/did_launch?steps=<json counts>&error=<tool or empty>`, form-urlencoded.
///
/// # Errors
///
/// Returns an error if the host is not a valid URL or the counts cannot be encoded.
pub fn build_report_url(
    host_url: &str,
    launches: &BTreeMap<String, u64>,
    error: Option<&str>,
) -> Result<Url, UsageError> {
    let mut url = Url::parse(&format!("{}/did_launch", host_url.trim_end_matches('/')))?;
    let steps = serde_json::to_string(launches)?;
    url.query_pairs_mut()
        .append_pair("steps", &steps)
        .append_pair("error", error.unwrap_or_default());
    Ok(url)
}

/// A report being sent in the background.
///
/// Dropping it leaves the thread running; the process may exit before the POST completes.
#[derive(Debug)]
pub struct PendingReport {
    done: mpsc::Receiver<()>,
}

impl PendingReport {
    /// Block until the report has been sent (or failed) or `timeout` elapses. Returns `true` only
    /// if the send attempt finished in time.
    pub fn wait(self, timeout: Duration) -> bool {
        self.done.recv_timeout(timeout).is_ok()
    }
}

/// POST `url` from a separate thread with its own runtime. The outcome is only logged at debug
/// level; the returned [`PendingReport`] lets the caller hold the process open for it.
///
/// # Errors
///
/// Returns an error only if the thread cannot be spawned.
pub fn dispatch_detached(url: Url, timeout: Duration) -> Result<PendingReport, UsageError> {
    let (tx, done) = mpsc::channel();
    std::thread::Builder::new()
        .name("usage-report".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    debug!(error = %e, "usage report runtime unavailable");
                    return;
                }
            };
            runtime.block_on(send(url, timeout));
            let _ = tx.send(());
        })?;
    Ok(PendingReport { done })
}

async fn send(url: Url, timeout: Duration) {
    let client = match reqwest::Client::builder().timeout(timeout).build() {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "usage report client unavailable");
            return;
        }
    };
    match client.post(url).send().await {
        Ok(resp) => debug!(status = resp.status().as_u16(), "usage report sent"),
        Err(e) => debug!(error = %e.without_url(), "usage report failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn decode(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn encodes_steps_as_json_and_error_name() {
        let launches = BTreeMap::from([("scan".to_string(), 1), ("gym".to_string(), 1)]);
        let url = build_report_url("https://example.test/", &launches, Some("scan")).expect("url");

        assert_eq!(url.path(), "/did_launch");
        let form = decode(&url);
        assert_eq!(form["steps"], r#"{"gym":1,"scan":1}"#);
        assert_eq!(form["error"], "scan");
    }

    #[test]
    fn missing_error_is_sent_empty() {
        let url = build_report_url("https://example.test", &BTreeMap::new(), None).expect("url");
        let form = decode(&url);
        assert_eq!(form["steps"], "{}");
        assert_eq!(form["error"], "");
    }

    #[test]
    fn invalid_host_is_an_error() {
        assert!(build_report_url("not a url", &BTreeMap::new(), None).is_err());
    }
}
