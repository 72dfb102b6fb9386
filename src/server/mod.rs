use std::sync::Arc;
use std::time::Duration;

use crate::igc::{IgcLocationParser, TrackParser, DEFAULT_FETCH_TIMEOUT};
use crate::track::TrackRegistry;

pub mod api;
pub mod routes;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Shared handles passed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<TrackRegistry>,
    pub parser: Arc<dyn TrackParser>,
    pub meta: Arc<api::ServiceMeta>,
}

impl AppState {
    /// Empty registry; uptime counts from now.
    pub fn new(parser: Arc<dyn TrackParser>) -> Self {
        AppState {
            registry: Arc::new(TrackRegistry::new()),
            parser,
            meta: Arc::new(api::ServiceMeta::started_now()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub fetch_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Blocks the calling thread until the server shuts down (Ctrl-C).
pub fn run_server(config: &ServerConfig) -> std::io::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config))
}

async fn serve(config: &ServerConfig) -> std::io::Result<()> {
    let parser = IgcLocationParser::new(config.fetch_timeout).map_err(std::io::Error::other)?;
    let app = routes::router(AppState::new(Arc::new(parser)));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "igcinfo server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
