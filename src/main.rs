//! Pulseboard Server - Entry Point
//!
//! Starts the broadcast scheduler and API server with graceful shutdown support.

use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};

use pulseboard::api::ApiServer;
use pulseboard::broadcast::{BroadcastHandle, BroadcastScheduler, RandomSnapshotGenerator};
use pulseboard::config::{LogConfig, ServerConfig};
use pulseboard::telemetry::init_tracing;

#[tokio::main]
async fn main() -> pulseboard::Result<()> {
    init_tracing(&LogConfig::from_env());

    info!("Starting Pulseboard server");

    // Load configuration
    let config = ServerConfig::from_env()?;
    info!("Configuration loaded");

    let scheduler = Arc::new(BroadcastScheduler::new(
        Box::new(RandomSnapshotGenerator::new()),
        config.broadcast_interval(),
    ));

    let (handle, shutdown) = BroadcastHandle::new();

    let broadcaster = scheduler.clone();
    let broadcast_shutdown = shutdown.clone();
    let broadcast_task = tokio::spawn(async move {
        broadcaster.run(broadcast_shutdown).await;
    });

    let api_server = ApiServer::new(config.clone(), scheduler);
    let api_task = tokio::spawn(async move {
        if let Err(e) = api_server.run(shutdown).await {
            error!("API server error: {}", e);
        }
    });

    info!(
        "Server started on {} - WebSocket ws://{}/ws, health http://{}/health",
        config.addr(),
        config.addr(),
        config.addr()
    );

    // Wait for shutdown signal
    shutdown_signal().await;
    info!("Shutdown signal received");

    handle.shutdown();
    let _ = tokio::join!(broadcast_task, api_task);

    info!("Pulseboard server stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
