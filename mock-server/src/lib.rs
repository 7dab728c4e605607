use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

/// Bytes served for every snapshot: a JPEG SOI/EOI pair around a comment.
pub const SNAPSHOT_BYTES: &[u8] = b"\xff\xd8\xff\xfe\x00\x06mock\xff\xd9";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Camera {
    pub key: String,
    pub enabled: bool,
}

/// The collect app's `config.json`: cameras keyed by name. Other sections
/// (servers, credentials) are ignored here.
#[derive(Debug, Default, Deserialize)]
pub struct CollectConfig {
    #[serde(default)]
    pub cameras: BTreeMap<String, CameraConfig>,
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl CollectConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn cameras(&self) -> Vec<Camera> {
        self.cameras
            .iter()
            .map(|(key, config)| Camera::new(key, config.enabled))
            .collect()
    }
}

impl Camera {
    pub fn new(key: &str, enabled: bool) -> Self {
        Self {
            key: key.to_string(),
            enabled,
        }
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    cameras: BTreeMap<String, Camera>,
    latest: HashMap<String, Vec<u8>>,
    saved: Vec<String>,
}

pub type Db = Arc<RwLock<Registry>>;

pub fn default_cameras() -> Vec<Camera> {
    vec![
        Camera::new("back", true),
        Camera::new("front", true),
        Camera::new("side", false),
    ]
}

pub fn app() -> Router {
    app_with(default_cameras())
}

pub fn app_with(cameras: Vec<Camera>) -> Router {
    let registry = Registry {
        cameras: cameras.into_iter().map(|c| (c.key.clone(), c)).collect(),
        ..Registry::default()
    };
    let db: Db = Arc::new(RwLock::new(registry));
    Router::new()
        .route("/cameras", get(list_cameras))
        .route("/cameras/{key}/img.jpg", get(snapshot))
        .route("/cameras/{key}/save", post(save_image))
        .route("/saved", get(list_saved))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

/// Serve any router; tests use this to stand up one-off fixtures.
pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "collect mock listening");
    }
    axum::serve(listener, router).await
}

fn allow_any_origin(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

async fn list_cameras(State(db): State<Db>) -> Response {
    let registry = db.read().await;
    // BTreeMap keys are already sorted.
    let keys: Vec<String> = registry.cameras.keys().cloned().collect();
    allow_any_origin(Json(keys).into_response())
}

async fn snapshot(State(db): State<Db>, Path(key): Path<String>) -> Result<Response, StatusCode> {
    let mut registry = db.write().await;
    match registry.cameras.get(&key) {
        Some(camera) if camera.enabled => {}
        _ => return Err(StatusCode::NOT_FOUND),
    }
    registry.latest.insert(key.clone(), SNAPSHOT_BYTES.to_vec());
    debug!(%key, "snapshot taken");
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], SNAPSHOT_BYTES).into_response())
}

async fn save_image(State(db): State<Db>, Path(key): Path<String>) -> Result<Response, StatusCode> {
    let mut registry = db.write().await;
    if !registry.latest.contains_key(&key) {
        return Err(StatusCode::NOT_FOUND);
    }
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let name = format!("{key}-{millis}.jpg");
    debug!(%name, "image saved");
    registry.saved.push(name);
    Ok(allow_any_origin(StatusCode::CREATED.into_response()))
}

async fn list_saved(State(db): State<Db>) -> Json<Vec<String>> {
    Json(db.read().await.saved.clone())
}
