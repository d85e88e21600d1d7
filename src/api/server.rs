//! API server using Axum
//!
//! Serves the health/status endpoints and the telemetry WebSocket.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::middleware::from_fn;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::broadcast::BroadcastScheduler;
use crate::config::ServerConfig;
use crate::error::{DashboardError, Result};

use super::middleware::{cors_layer, RequestLogging};
use super::routes;

/// Shared state for API handlers
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<BroadcastScheduler>,
    pub started_at: Instant,
}

/// API server
pub struct ApiServer {
    config: ServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ServerConfig, scheduler: Arc<BroadcastScheduler>) -> Self {
        let state = AppState {
            scheduler,
            started_at: Instant::now(),
        };

        Self { config, state }
    }

    /// Build the router
    pub fn router(&self) -> Router {
        let cors = cors_layer(&self.config.client_origin);

        routes::create_router(self.state.clone())
            .layer(from_fn(RequestLogging::log_request))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address and serve until shutdown
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let addr: SocketAddr = self.config.addr().parse().map_err(|_| {
            DashboardError::InvalidConfig(format!("Invalid server address: {}", self.config.addr()))
        })?;

        let listener = TcpListener::bind(addr).await?;
        info!("API server listening on {}", addr);

        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until shutdown
    pub async fn serve(&self, listener: TcpListener, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
            })
            .await
            .map_err(|e| DashboardError::Internal(e.to_string()))?;

        info!("API server shut down");
        Ok(())
    }
}
