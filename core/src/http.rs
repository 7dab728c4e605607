//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! `DataClient` builds an `HttpRequest` and parses an `HttpResponse` without
//! touching the network. Whoever holds a `Transport` performs the round-trip.
//! Fields are owned so values can cross threads and the C boundary freely.

/// A GET request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
