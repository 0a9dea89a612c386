//! HTTP endpoint serving `/metrics`.

use super::export_metrics;
use crate::core::{CleanerError, Result};
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use prometheus::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Clone)]
struct MetricsState {
    registry: Arc<Registry>,
}

async fn metrics_handler(State(state): State<MetricsState>) -> Response {
    match export_metrics(&state.registry) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(err) => {
            error!("Failed to encode metrics: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

pub fn metrics_router(registry: Arc<Registry>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(MetricsState { registry })
}

/// Binds `:port` addresses on all interfaces.
pub fn normalize_listen_addr(addr: &str) -> String {
    let addr = addr.trim();
    if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    }
}

/// A running metrics server; aborted when dropped.
pub struct MetricsServer {
    local_addr: SocketAddr,
    join_handle: JoinHandle<()>,
}

impl MetricsServer {
    pub async fn start(listen: &str, registry: Arc<Registry>) -> Result<Self> {
        let addr = normalize_listen_addr(listen);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| CleanerError::Config(format!("Invalid metrics server address '{}': {}", listen, e)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| CleanerError::io(&addr, e))?;

        let app = metrics_router(registry);
        let join_handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                error!("Metrics server error: {}", err);
            }
        });

        info!("Metrics server listening at: {}", local_addr);
        Ok(Self {
            local_addr,
            join_handle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Drop for MetricsServer {
    fn drop(&mut self) {
        self.join_handle.abort();
    }
}
