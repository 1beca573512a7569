use anyhow::Context as _;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A request as seen by the stub server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Lower-cased header names. Repeated headers keep every value.
    pub headers: HashMap<String, Vec<String>>,
    pub body: String,
}

impl RecordedRequest {
    /// First value of a header (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|v| v.first())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl StubResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, body).with_header("content-type", "application/json")
    }

    #[must_use]
    pub fn redirect(status: u16, location: &str) -> Self {
        Self::new(status, "").with_header("location", location)
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

#[derive(Debug, Clone)]
struct StubRoute {
    method: Method,
    path: String,
    response: StubResponse,
}

#[derive(Default)]
struct StubState {
    routes: Vec<StubRoute>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// In-process HTTP server answering canned responses by method + path.
///
/// Unmatched requests get a `404` with body `no stub`. Every request is recorded.
pub struct StubServer {
    base_url: String,
    state: Arc<StubState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<std::io::Result<()>>>,
}

#[derive(Default)]
pub struct StubServerBuilder {
    routes: Vec<StubRoute>,
}

impl StubServerBuilder {
    /// # Panics
    ///
    /// Panics if `method` is not a valid HTTP method token.
    #[must_use]
    pub fn route(mut self, method: &str, path: &str, response: StubResponse) -> Self {
        self.routes.push(StubRoute {
            method: method.parse().expect("valid HTTP method"),
            path: path.to_string(),
            response,
        });
        self
    }

    /// Bind `127.0.0.1:0` and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start(self) -> anyhow::Result<StubServer> {
        let listener = TcpListener::bind("127.0.0.1:0").await.context("bind")?;
        let addr = listener.local_addr().context("local_addr")?;
        let state = Arc::new(StubState {
            routes: self.routes,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(respond).with_state(state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        let handle = tokio::spawn(async move { server.await });

        Ok(StubServer {
            base_url: format!("http://{addr}"),
            state,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }
}

impl StubServer {
    #[must_use]
    pub fn builder() -> StubServerBuilder {
        StubServerBuilder::default()
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    /// Poll until at least `count` requests were recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout elapses first.
    pub async fn wait_for_requests(
        &self,
        count: usize,
        timeout_dur: Duration,
    ) -> anyhow::Result<Vec<RecordedRequest>> {
        let start = Instant::now();
        loop {
            let seen = self.requests();
            if seen.len() >= count {
                return Ok(seen);
            }
            if start.elapsed() > timeout_dur {
                anyhow::bail!("timed out waiting for {count} request(s), saw {}", seen.len());
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// Stop the server and wait for it to exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the server task failed.
    pub async fn shutdown(mut self) -> anyhow::Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("server task join")?
                .context("server result")?;
        }
        Ok(())
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn respond(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut recorded_headers: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in &headers {
        recorded_headers
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    state.requests.lock().push(RecordedRequest {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers: recorded_headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let Some(route) = state
        .routes
        .iter()
        .find(|r| r.method == method && r.path == uri.path())
    else {
        return (StatusCode::NOT_FOUND, "no stub").into_response();
    };

    let status = StatusCode::from_u16(route.response.status).unwrap_or(StatusCode::OK);
    let mut out_headers = HeaderMap::new();
    for (name, value) in &route.response.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            out_headers.append(name, value);
        }
    }
    (status, out_headers, route.response.body.clone()).into_response()
}
