//! Performs the GET that `DataClient` only describes.
//!
//! # Design
//! `Transport` is the single I/O seam. `Fetcher` pairs it with a
//! `DataClient` and offers three call shapes:
//! - `fetch_json`: blocking, returns a `Result`.
//! - `fetch_data_with`: runs on a worker thread and hands the `Result` to a
//!   callback exactly once.
//! - `fetch_data`: runs on a worker thread and calls back whenever the body
//!   decodes as JSON, whatever the status. Transport and decode failures are
//!   logged at `warn` and otherwise dropped.
//!
//! Every call is independent: no retries, no timeout, no shared state beyond
//! the read-only transport.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::DataClient;
use crate::error::FetchError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one HTTP request. Implementations map every failure that
/// prevents a response from arriving to `FetchError::Transport`.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FetchError>;
}

/// Blocking transport backed by a `ureq` agent.
///
/// Status codes are returned as data, never as errors, so the client decides
/// what a 4xx/5xx means.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let mut builder = self.agent.get(&request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        let mut response = builder
            .call()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        // Binary bodies must reach the JSON decoder, not fail here.
        let bytes = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

pub struct Fetcher<T = UreqTransport> {
    client: DataClient,
    transport: Arc<T>,
}

impl Fetcher<UreqTransport> {
    pub fn new(client: DataClient) -> Self {
        Self::with_transport(client, UreqTransport::new())
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn with_transport(client: DataClient, transport: T) -> Self {
        Self {
            client,
            transport: Arc::new(transport),
        }
    }

    pub fn client(&self) -> &DataClient {
        &self.client
    }

    pub fn build_url(&self, path: &str) -> String {
        self.client.build_url(path)
    }

    /// One GET of `build_url(path)`, decoded as JSON. Blocks the caller.
    pub fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
        let request = self.client.build_fetch(path);
        debug!(url = %request.url, "fetching");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, bytes = response.body.len(), "fetched");
        self.client.parse_fetch(response)
    }

    /// Like [`Fetcher::fetch_json`], but decodes the body whatever the
    /// status: only transport and decode failures are errors.
    pub fn fetch_body(&self, path: &str) -> Result<Value, FetchError> {
        let request = self.client.build_fetch(path);
        debug!(url = %request.url, "fetching");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, bytes = response.body.len(), "fetched");
        self.client.decode_body(&response)
    }
}

impl<T: Transport + 'static> Fetcher<T> {
    /// Fetch on a worker thread and pass the outcome to `callback`.
    ///
    /// `callback` runs exactly once, after the response has been received and
    /// decoded, on the worker thread. The returned handle may be dropped.
    pub fn fetch_data_with<F>(&self, path: &str, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<Value, FetchError>) + Send + 'static,
    {
        let fetcher = self.clone();
        let path = path.to_string();
        thread::spawn(move || callback(fetcher.fetch_json(&path)))
    }

    /// Fetch on a worker thread and pass the decoded value to `callback`.
    ///
    /// Any response whose body is JSON is delivered, including 4xx/5xx.
    /// On a transport or decode failure `callback` is never called and the
    /// error is only logged. Use [`Fetcher::fetch_data_with`] to observe
    /// failures.
    pub fn fetch_data<F>(&self, path: &str, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Value) + Send + 'static,
    {
        let fetcher = self.clone();
        let path = path.to_string();
        thread::spawn(move || match fetcher.fetch_body(&path) {
            Ok(value) => callback(value),
            Err(err) => {
                let url = fetcher.build_url(&path);
                warn!(%url, error = %err, "fetch failed, dropping result");
            }
        })
    }
}

impl<T> Clone for Fetcher<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T> fmt::Debug for Fetcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}
