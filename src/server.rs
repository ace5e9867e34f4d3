//! HTTP surface of the exporter.
//!
//! Serves the scrape endpoint plus liveness, uptime and a static landing page.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use log::{error, info};
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, TEXT_FORMAT, TextEncoder};

use crate::collector::Collector;
use crate::error::{AgentError, Result};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub collector: Arc<dyn Collector>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(collector: Arc<dyn Collector>) -> Self {
        Self {
            collector,
            started_at: Instant::now(),
        }
    }
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/uptime", get(uptime_handler))
        .with_state(Arc::new(state))
}

/// Bind to `port` on all interfaces and serve until interrupted.
pub async fn serve(collector: Arc<dyn Collector>, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Custom Exporter starting on port {}", port);
    info!("Metrics endpoint: http://localhost:{}/metrics", port);

    axum::serve(listener, create_router(AppState::new(collector)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AgentError::Server(e.to_string()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received interrupt signal, shutting down...");
}

/// Landing page.
async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Render metric families in the text exposition format
fn encode_metrics(families: &[MetricFamily]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(families, &mut buffer)?;
    Ok(buffer)
}

/// Scrape endpoint: runs one collection cycle.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let families = state.collector.collect().await;

    match encode_metrics(&families) {
        Ok(buffer) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, TEXT_FORMAT)],
            buffer,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)).into_response()
        }
    }
}

/// Liveness check.
async fn health_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/html")], "OK")
}

/// Whole seconds since the server started.
async fn uptime_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = state.started_at.elapsed().as_secs_f64();
    ([(header::CONTENT_TYPE, "text/plain")], format!("{:.0}", uptime))
}
