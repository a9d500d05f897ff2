// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Status and workspace client for the API gateway.
//!
//! Subsystem health is fetched at most once per [`StatusClient`]. The first
//! call to [`StatusClient::get_status`] claims a single slot holding a shared
//! query; every later call returns a clone of that same query, whether it is
//! still pending, succeeded, or failed. Workspace listings are never cached.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, info, warn};

use crate::error::ClientError;
use crate::model::{decode_status, decode_workspaces, StatusReport, Workspace};
use crate::transport::{endpoint_url, HttpTransport, Transport};

/// Default gateway base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4201/api/v1";

/// Outcome shared by every consumer of the status query.
pub type StatusOutcome = Result<Arc<StatusReport>, ClientError>;

/// Configuration for [`StatusClient::new`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Gateway base URL, e.g. `http://localhost:4201/api/v1`.
    pub base_url: String,
    /// Per-request timeout applied by the HTTP transport.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Handle to the memoized status fetch.
///
/// Cloning is cheap; all clones resolve to the same outcome. The underlying
/// request starts when the first clone is awaited.
#[derive(Clone)]
pub struct StatusQuery {
    inner: Shared<BoxFuture<'static, StatusOutcome>>,
}

impl StatusQuery {
    fn new(fut: BoxFuture<'static, StatusOutcome>) -> Self {
        Self { inner: fut.shared() }
    }

    /// The settled outcome, if the request has already completed.
    #[must_use]
    pub fn peek(&self) -> Option<&StatusOutcome> {
        self.inner.peek()
    }
}

impl Future for StatusQuery {
    type Output = StatusOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx)
    }
}

impl std::fmt::Debug for StatusQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusQuery")
            .field("settled", &self.peek().is_some())
            .finish()
    }
}

/// Client for the gateway's `/status` and `/workspaces` endpoints.
///
/// Callers own the client; dropping it discards the cached status.
pub struct StatusClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    status: OnceLock<StatusQuery>,
}

impl std::fmt::Debug for StatusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusClient")
            .field("base_url", &self.base_url)
            .field("status", &self.status.get())
            .finish_non_exhaustive()
    }
}

impl StatusClient {
    /// Create a client talking HTTP to the configured gateway.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config.request_timeout)?;
        Ok(Self::with_transport(config.base_url, Arc::new(transport)))
    }

    /// Create a client over an arbitrary transport.
    #[must_use]
    pub fn with_transport(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            status: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the subsystem health query.
    ///
    /// The first call creates the query; every call returns the same one.
    /// A failed fetch stays cached for the lifetime of this client.
    pub fn get_status(&self) -> StatusQuery {
        self.status
            .get_or_init(|| {
                let url = endpoint_url(&self.base_url, "status");
                info!("Creating status query for {url}");
                StatusQuery::new(fetch_status(Arc::clone(&self.transport), url).boxed())
            })
            .clone()
    }

    /// Whether the status query has been created.
    #[must_use]
    pub fn has_status_query(&self) -> bool {
        self.status.get().is_some()
    }

    /// Fetch the workspace list. Every call issues a new request.
    pub async fn get_workspaces(&self) -> Result<Vec<Workspace>, ClientError> {
        let url = endpoint_url(&self.base_url, "workspaces");
        let body = self.transport.get(&url).await?;
        debug!("Raw workspaces response: {}", String::from_utf8_lossy(&body));

        let workspaces = decode_workspaces(&body)?;
        debug!("Received {} workspaces", workspaces.len());
        Ok(workspaces)
    }
}

async fn fetch_status(transport: Arc<dyn Transport>, url: String) -> StatusOutcome {
    let result = async {
        let body = transport.get(&url).await?;
        debug!("Raw status response: {}", String::from_utf8_lossy(&body));
        decode_status(&body)
    }
    .await;

    match result {
        Ok(report) => {
            info!(
                "Status received: {} subsystems, failed={}",
                report.systems.len(),
                report.failed
            );
            Ok(Arc::new(report))
        }
        Err(e) => {
            warn!("Status query failed and will stay cached: {e}");
            Err(e)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Canned responses keyed by URL, with per-URL call counts and an
    /// optional gate that holds every response until opened.
    pub(crate) struct MockTransport {
        responses: Mutex<HashMap<String, Result<Vec<u8>, ClientError>>>,
        calls: Mutex<HashMap<String, usize>>,
        total: AtomicUsize,
        gated: AtomicBool,
        gate: Notify,
    }

    impl MockTransport {
        pub(crate) fn new() -> Self {
            Self {
                responses: Mutex::new(HashMap::new()),
                calls: Mutex::new(HashMap::new()),
                total: AtomicUsize::new(0),
                gated: AtomicBool::new(false),
                gate: Notify::new(),
            }
        }

        pub(crate) fn respond(&self, url: &str, response: Result<&str, ClientError>) {
            self.responses.lock().unwrap().insert(
                url.to_string(),
                response.map(|body| body.as_bytes().to_vec()),
            );
        }

        pub(crate) fn hold(&self) {
            self.gated.store(true, Ordering::SeqCst);
        }

        pub(crate) fn release(&self) {
            self.gated.store(false, Ordering::SeqCst);
            self.gate.notify_waiters();
        }

        pub(crate) fn calls(&self, url: &str) -> usize {
            self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
        }

        pub(crate) fn total_calls(&self) -> usize {
            self.total.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn get(&self, url: &str) -> Result<Vec<u8>, ClientError> {
            *self.calls.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;
            self.total.fetch_add(1, Ordering::SeqCst);

            while self.gated.load(Ordering::SeqCst) {
                let notified = self.gate.notified();
                if !self.gated.load(Ordering::SeqCst) {
                    break;
                }
                notified.await;
            }

            self.responses
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .unwrap_or_else(|| {
                    Err(ClientError::HttpStatus {
                        url: url.to_string(),
                        status: 404,
                    })
                })
        }
    }

    const BASE: &str = "http://gateway.test/api/v1/";
    const STATUS_URL: &str = "http://gateway.test/api/v1/status";
    const WORKSPACES_URL: &str = "http://gateway.test/api/v1/workspaces";

    fn client_with(transport: &Arc<MockTransport>) -> StatusClient {
        StatusClient::with_transport(BASE, Arc::clone(transport) as Arc<dyn Transport>)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_status_issues_one_request() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            STATUS_URL,
            Ok(r#"{"failed":false,"systems":{"a":true,"b":false}}"#),
        );
        transport.hold();

        let client = Arc::new(client_with(&transport));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let client = Arc::clone(&client);
            handles.push(tokio::spawn(async move { client.get_status().await }));
        }

        // Let every task subscribe before the response is released.
        while transport.total_calls() == 0 {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        transport.release();

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(transport.calls(STATUS_URL), 1);
        for report in &outcomes {
            assert!(Arc::ptr_eq(report, &outcomes[0]));
        }
        assert_eq!(outcomes[0].systems.get("b"), Some(false));
    }

    #[tokio::test]
    async fn test_status_cached_after_success() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(STATUS_URL, Ok(r#"{"failed":false,"systems":{"a":true}}"#));
        let client = client_with(&transport);

        assert!(!client.has_status_query());
        let first = client.get_status().await.unwrap();
        let second = client.get_status().await.unwrap();

        assert!(client.has_status_query());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(transport.calls(STATUS_URL), 1);
        assert!(client.get_status().peek().is_some());
    }

    #[tokio::test]
    async fn test_status_failure_is_cached() {
        let transport = Arc::new(MockTransport::new());
        let failure = ClientError::Transport {
            url: STATUS_URL.to_string(),
            message: "connection refused".to_string(),
        };
        transport.respond(STATUS_URL, Err(failure.clone()));
        let client = client_with(&transport);

        let first = client.get_status().await.unwrap_err();
        assert_eq!(first, failure);

        // A healthy backend does not help this client instance.
        transport.respond(STATUS_URL, Ok(r#"{"failed":false,"systems":{}}"#));
        let second = client.get_status().await.unwrap_err();

        assert_eq!(second, failure);
        assert_eq!(transport.calls(STATUS_URL), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_callers_share_failure() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(STATUS_URL, Ok(r#"{"failed":false}"#));
        transport.hold();

        let client = Arc::new(client_with(&transport));
        let a = tokio::spawn({
            let client = Arc::clone(&client);
            async move { client.get_status().await }
        });
        let b = tokio::spawn({
            let client = Arc::clone(&client);
            async move { client.get_status().await }
        });

        while transport.total_calls() == 0 {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        transport.release();

        let a = a.await.unwrap().unwrap_err();
        let b = b.await.unwrap().unwrap_err();

        assert_eq!(a, b);
        assert!(matches!(a, ClientError::Decode { endpoint: "status", .. }));
        assert_eq!(transport.calls(STATUS_URL), 1);
    }

    #[tokio::test]
    async fn test_unawaited_query_issues_no_request() {
        let transport = Arc::new(MockTransport::new());
        let client = client_with(&transport);

        let query = client.get_status();
        assert!(query.peek().is_none());
        assert_eq!(transport.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_workspaces_not_cached() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            WORKSPACES_URL,
            Ok(r#"[{"namespace":"ns","name":"one"},{"namespace":"ns","name":"two"}]"#),
        );
        let client = client_with(&transport);

        let first = client.get_workspaces().await.unwrap();
        let second = client.get_workspaces().await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_eq!(transport.calls(WORKSPACES_URL), 2);
    }

    #[tokio::test]
    async fn test_workspaces_error_propagates() {
        let transport = Arc::new(MockTransport::new());
        let client = client_with(&transport);

        let err = client.get_workspaces().await.unwrap_err();
        assert_eq!(
            err,
            ClientError::HttpStatus {
                url: WORKSPACES_URL.to_string(),
                status: 404
            }
        );
    }

    #[tokio::test]
    async fn test_status_and_workspaces_are_independent() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(STATUS_URL, Ok(r#"{"failed":true,"systems":{"a":true}}"#));
        transport.respond(WORKSPACES_URL, Ok("[]"));
        let client = client_with(&transport);

        let (status, workspaces) = tokio::join!(client.get_status(), client.get_workspaces());

        assert!(status.unwrap().failed);
        assert!(workspaces.unwrap().is_empty());
        assert_eq!(transport.total_calls(), 2);
    }
}
