//! Stateless URL builder and JSON response parser.
//!
//! # Design
//! `DataClient` holds only a `ClientConfig` and carries no mutable state
//! between calls. `build_url` and `build_fetch` produce data; `parse_fetch`
//! consumes data. The network round-trip happens elsewhere (see `fetch`).

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::http::{HttpRequest, HttpResponse};
use crate::origin::Origin;

#[derive(Debug, Clone)]
pub struct DataClient {
    config: ClientConfig,
}

impl DataClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn from_origin(origin: Origin) -> Self {
        Self::new(ClientConfig::new(origin))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `scheme://hostname:port` followed by `path`, verbatim.
    ///
    /// No validation happens here: an empty hostname or port yields a
    /// malformed URL rather than an error.
    pub fn build_url(&self, path: &str) -> String {
        let origin = &self.config.origin;
        format!(
            "{}://{}:{}{path}",
            origin.scheme(),
            origin.hostname(),
            self.config.resolved_port()
        )
    }

    pub fn build_fetch(&self, path: &str) -> HttpRequest {
        HttpRequest {
            url: self.build_url(path),
            headers: vec![("accept".to_string(), "application/json".to_string())],
        }
    }

    pub fn parse_fetch(&self, response: HttpResponse) -> Result<Value, FetchError> {
        self.parse_fetch_as(response)
    }

    /// Decode a successful response body into `T`.
    pub fn parse_fetch_as<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, FetchError> {
        if !response.is_success() {
            return Err(FetchError::HttpStatus {
                status: response.status,
                body: response.body,
            });
        }
        self.decode_body(&response)
    }

    /// Decode the body into `T` without looking at the status.
    pub fn decode_body<T: DeserializeOwned>(&self, response: &HttpResponse) -> Result<T, FetchError> {
        serde_json::from_str(&response.body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}
