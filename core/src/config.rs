//! Client configuration: the origin plus an optional port override.
//!
//! The override exists for development setups where the page is served on
//! one port and the data API listens on another.

use crate::error::FetchError;
use crate::origin::Origin;

/// Origin used when `APP_ORIGIN` is unset.
pub const DEFAULT_ORIGIN: &str = "http://localhost:8002";

pub const ORIGIN_VAR: &str = "APP_ORIGIN";
pub const PORT_OVERRIDE_VAR: &str = "APP_PORT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub origin: Origin,
    pub port_override: Option<String>,
}

impl ClientConfig {
    pub fn new(origin: Origin) -> Self {
        Self {
            origin,
            port_override: None,
        }
    }

    pub fn with_port_override(mut self, port: impl Into<String>) -> Self {
        self.port_override = Some(port.into());
        self
    }

    /// Read `APP_ORIGIN` and `APP_PORT` from the process environment.
    pub fn from_env() -> Result<Self, FetchError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, FetchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let origin = match lookup(ORIGIN_VAR) {
            Some(raw) if !raw.trim().is_empty() => Origin::parse(&raw)?,
            _ => Origin::parse(DEFAULT_ORIGIN)?,
        };
        Ok(Self {
            origin,
            port_override: lookup(PORT_OVERRIDE_VAR),
        })
    }

    /// The override when present and non-empty, otherwise the origin's port.
    /// The override is used verbatim.
    pub fn resolved_port(&self) -> &str {
        match self.port_override.as_deref() {
            Some(port) if !port.is_empty() => port,
            _ => self.origin.port(),
        }
    }
}
