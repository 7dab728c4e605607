//! End-to-end fetches against a live mock server.
//!
//! # Design
//! Each test starts a server on a random port from a plain thread running a
//! current-thread tokio runtime, then drives the blocking `Fetcher` over real
//! HTTP. Callback tests wait on a channel with a bounded timeout.

use std::net::SocketAddr;
use std::sync::mpsc;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Json, Router};
use collect_core::{ClientConfig, DataClient, FetchError, Fetcher, Origin};
use serde_json::{json, Value};

const WAIT: Duration = Duration::from_secs(5);
const SILENCE: Duration = Duration::from_millis(300);

fn spawn_server(router: Router) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::serve(listener, router).await
        })
        .unwrap();
    });

    addr
}

/// The mock's `/api/x` fixture plus the collect camera routes.
fn fixture_router() -> Router {
    Router::new()
        .route("/api/x", get(|| async { Json(json!({"a": 1})) }))
        .route("/api/text", get(|| async { "plain text, not json" }))
        .route(
            "/api/missing",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({"error": "missing"}))) }),
        )
        .merge(mock_server::app())
}

fn fetcher_for(addr: SocketAddr) -> Fetcher {
    let origin = Origin::new("http", &addr.ip().to_string(), &addr.port().to_string());
    Fetcher::new(DataClient::from_origin(origin))
}

/// A port nothing listens on: bind, note the port, release it.
fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

#[test]
fn fetch_data_delivers_json_once() {
    let addr = spawn_server(fixture_router());
    let fetcher = fetcher_for(addr);

    let (tx, rx) = mpsc::channel();
    fetcher.fetch_data("/api/x", move |value| tx.send(value).unwrap());

    assert_eq!(rx.recv_timeout(WAIT).unwrap(), json!({"a": 1}));
    assert!(rx.recv_timeout(SILENCE).is_err(), "callback ran twice");
}

#[test]
fn fetch_data_delivers_json_from_error_status() {
    let addr = spawn_server(fixture_router());
    let fetcher = fetcher_for(addr);

    let (tx, rx) = mpsc::channel();
    fetcher
        .fetch_data("/api/missing", move |value| tx.send(value).unwrap())
        .join()
        .unwrap();

    assert_eq!(rx.recv_timeout(WAIT).unwrap(), json!({"error": "missing"}));
}

#[test]
fn fetch_json_reads_camera_list() {
    let addr = spawn_server(fixture_router());
    let value = fetcher_for(addr).fetch_json("/cameras").unwrap();
    assert_eq!(value, json!(["back", "front", "side"]));
}

#[test]
fn fetch_data_ignores_non_json_body() {
    let addr = spawn_server(fixture_router());
    let fetcher = fetcher_for(addr);

    let (tx, rx) = mpsc::channel::<Value>();
    let tx2 = tx.clone();
    let text = fetcher.fetch_data("/api/text", move |value| tx.send(value).unwrap());
    let jpeg = fetcher.fetch_data("/cameras/front/img.jpg", move |value| tx2.send(value).unwrap());

    text.join().unwrap();
    jpeg.join().unwrap();
    assert!(rx.recv_timeout(SILENCE).is_err());
}

#[test]
fn fetch_data_ignores_connection_error() {
    let origin = Origin::new("http", "127.0.0.1", &closed_port().to_string());
    let fetcher = Fetcher::new(DataClient::from_origin(origin));

    let (tx, rx) = mpsc::channel::<Value>();
    let handle = fetcher.fetch_data("/api/x", move |value| tx.send(value).unwrap());

    handle.join().unwrap();
    assert!(rx.recv_timeout(SILENCE).is_err());
}

#[test]
fn fetch_data_with_reports_each_failure() {
    let addr = spawn_server(fixture_router());
    let fetcher = fetcher_for(addr);

    let (tx, rx) = mpsc::channel();
    fetcher
        .fetch_data_with("/api/text", move |result| tx.send(result).unwrap())
        .join()
        .unwrap();
    assert!(matches!(rx.recv_timeout(WAIT).unwrap(), Err(FetchError::Decode(_))));

    let (tx, rx) = mpsc::channel();
    fetcher
        .fetch_data_with("/cameras/side/img.jpg", move |result| tx.send(result).unwrap())
        .join()
        .unwrap();
    assert!(matches!(
        rx.recv_timeout(WAIT).unwrap(),
        Err(FetchError::HttpStatus { status: 404, .. })
    ));

    let origin = Origin::new("http", "127.0.0.1", &closed_port().to_string());
    let unreachable = Fetcher::new(DataClient::from_origin(origin));
    let (tx, rx) = mpsc::channel();
    unreachable
        .fetch_data_with("/api/x", move |result| tx.send(result).unwrap())
        .join()
        .unwrap();
    assert!(matches!(rx.recv_timeout(WAIT).unwrap(), Err(FetchError::Transport(_))));
}

#[test]
fn port_override_redirects_requests() {
    let addr = spawn_server(fixture_router());
    // The page origin points at a dead port; the override points at the API.
    let origin = Origin::new("http", &addr.ip().to_string(), &closed_port().to_string());
    let config = ClientConfig::new(origin).with_port_override(addr.port().to_string());
    let fetcher = Fetcher::new(DataClient::new(config));

    assert_eq!(fetcher.fetch_json("/api/x").unwrap(), json!({"a": 1}));
}

#[test]
fn concurrent_fetches_are_independent() {
    let addr = spawn_server(fixture_router());
    let fetcher = fetcher_for(addr);

    let (tx, rx) = mpsc::channel();
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let tx = tx.clone();
            let path = if i % 2 == 0 { "/api/x" } else { "/cameras" };
            fetcher.fetch_data(path, move |value| tx.send(value).unwrap())
        })
        .collect();
    drop(tx);
    for handle in handles {
        handle.join().unwrap();
    }

    let values: Vec<Value> = rx.iter().collect();
    assert_eq!(values.len(), 8);
    assert_eq!(values.iter().filter(|v| **v == json!({"a": 1})).count(), 4);
}
