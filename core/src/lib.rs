//! Client core for the collect data API.
//!
//! # Overview
//! Builds same-origin URLs for the collect service and fetches JSON from
//! them. URL construction and response parsing are pure (`DataClient`); the
//! network round-trip sits behind the `Transport` trait (`Fetcher`).
//!
//! # Design
//! - The origin and port override are explicit configuration, read once at
//!   startup (`ClientConfig::from_env`) rather than looked up per call.
//! - `Fetcher::fetch_data_with` reports every failure to its callback.
//!   `Fetcher::fetch_data` keeps the success-only contract and logs failures.
//! - Types use owned `String` / `Vec` fields to simplify FFI mapping.

pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod origin;

pub use client::DataClient;
pub use config::ClientConfig;
pub use error::FetchError;
pub use fetch::{Fetcher, Transport, UreqTransport};
pub use http::{HttpRequest, HttpResponse};
pub use origin::Origin;
