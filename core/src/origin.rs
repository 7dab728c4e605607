//! The scheme/host/port triple that every URL is built against.
//!
//! # Design
//! A browser page reads these values from its own location. Here they are an
//! explicit value handed to the client at startup, so URL construction stays a
//! pure function of its inputs.

use url::Url;

use crate::error::FetchError;

/// Scheme, hostname and port of the service being called.
///
/// `port` is kept as text: an empty port is legal and is concatenated as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    scheme: String,
    hostname: String,
    port: String,
}

impl Origin {
    /// Build an origin from its parts. A single trailing `:` on `scheme` is
    /// dropped, so `"http"` and `"http:"` are equivalent.
    pub fn new(scheme: &str, hostname: &str, port: &str) -> Self {
        Self {
            scheme: scheme.strip_suffix(':').unwrap_or(scheme).to_string(),
            hostname: hostname.to_string(),
            port: port.to_string(),
        }
    }

    /// Parse `scheme://host[:port]`. An omitted port, or one equal to the
    /// scheme's default, is stored empty, as a browser reports it.
    pub fn parse(input: &str) -> Result<Self, FetchError> {
        let url = Url::parse(input.trim())
            .map_err(|e| FetchError::InvalidOrigin(format!("{input}: {e}")))?;
        let hostname = url
            .host_str()
            .ok_or_else(|| FetchError::InvalidOrigin(format!("{input}: missing host")))?;
        let port = url.port().map(|p| p.to_string()).unwrap_or_default();
        Ok(Self::new(url.scheme(), hostname, &port))
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> &str {
        &self.port
    }
}
