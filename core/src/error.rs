//! Error types for the collect data client.
//!
//! # Design
//! Transport failures and decode failures get separate variants so a caller
//! can tell "the service was unreachable" from "the service answered with
//! something that is not JSON". Non-2xx answers keep the raw status and body.

use thiserror::Error;

/// Errors produced while configuring the client or fetching data.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The configured origin could not be parsed.
    #[error("invalid origin: {0}")]
    InvalidOrigin(String),

    /// The request never produced a response (refused, DNS, I/O).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The response body was not valid JSON for the requested type.
    #[error("decode failed: {0}")]
    Decode(String),
}
