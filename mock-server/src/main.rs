use mock_server::CollectConfig;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // COLLECT_CONFIG points at the collect app's config.json; without it the
    // built-in camera set is served.
    let router = match std::env::var("COLLECT_CONFIG") {
        Ok(path) => {
            let raw = tokio::fs::read_to_string(&path).await?;
            let config = CollectConfig::from_json(&raw).map_err(std::io::Error::other)?;
            tracing::info!(%path, cameras = config.cameras.len(), "loaded camera config");
            mock_server::app_with(config.cameras())
        }
        Err(_) => mock_server::app(),
    };

    let port = std::env::var("PORT").unwrap_or_else(|_| "8002".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    mock_server::serve(listener, router).await
}
