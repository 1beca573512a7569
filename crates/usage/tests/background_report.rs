use lanekit_test_support::{StubResponse, StubServer};
use lanekit_usage::{CollectorSettings, Dispatch, ToolCollector};
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[tokio::test]
async fn background_report_has_arrived_once_wait_returns() -> anyhow::Result<()> {
    let server = StubServer::builder()
        .route("POST", "/did_launch", StubResponse::new(200, "ok"))
        .start()
        .await?;
    let home = tempfile::tempdir()?;

    let collector = ToolCollector::new(CollectorSettings {
        dispatch: Dispatch::Background,
        host_url: server.base_url().to_string(),
        on_ci: true,
        ..CollectorSettings::dry_run(home.path())
    });
    collector.did_launch_action("gym");
    collector.did_launch_action("gym");
    collector.did_raise_error("gym");

    assert_eq!(collector.did_finish(), None);
    let finished = tokio::task::spawn_blocking(move || collector.wait_for_report()).await?;
    assert!(finished);

    // The send completed before wait_for_report returned.
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/did_launch");

    let query = req.query.clone().unwrap_or_default();
    let form: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();
    assert_eq!(form["steps"], r#"{"gym":2}"#);
    assert_eq!(form["error"], "gym");

    server.shutdown().await
}

#[tokio::test]
async fn unreachable_endpoint_is_silently_ignored() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    let collector = ToolCollector::new(CollectorSettings {
        dispatch: Dispatch::Background,
        // Nothing listens on the discard port.
        host_url: "http://127.0.0.1:9".to_string(),
        send_timeout: Duration::from_millis(200),
        ..CollectorSettings::dry_run(home.path())
    });
    collector.did_launch_action("scan");

    assert_eq!(collector.did_finish(), None);
    let started = Instant::now();
    tokio::task::spawn_blocking(move || collector.wait_for_report()).await?;
    assert!(started.elapsed() < Duration::from_secs(5));
    Ok(())
}
