mod routes;

use anyhow::Context;
use dependencies::DependencyManager;
use node_manager::{MemoryNodeStore, NodeManager};
use routes::SchedulerState;
use scale_core::{SchedulerConfig, BUILD_INFO};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Scale Scheduler {}", BUILD_INFO);

    let config = SchedulerConfig::from_env().context("failed to load scheduler configuration")?;
    info!(
        bind_address = %config.bind_address,
        min_online_nodes = config.nodes.min_online_nodes,
        sync_interval_secs = config.nodes.sync_interval_secs,
        "Configuration loaded"
    );

    let nodes = NodeManager::new(Arc::new(MemoryNodeStore::new()));
    let dependencies = DependencyManager::from_config(&config.dependencies, &config.nodes, nodes.clone())
        .context("failed to build dependency probes")?;

    let cancel = CancellationToken::new();
    let sync_loop = nodes.spawn_sync_loop(config.nodes.clone(), cancel.clone());

    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, initiating graceful shutdown");
        cancel_on_signal.cancel();
    });

    let state = Arc::new(SchedulerState::new(nodes, dependencies));
    let app = routes::router(state);

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;
    info!("Scale Scheduler listening on {}", listener.local_addr()?);

    let server_cancel = cancel.clone();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move { server_cancel.cancelled().await })
        .await;

    // Stop the sync loop even if the server exited on its own.
    cancel.cancel();
    if let Err(e) = sync_loop.await {
        error!(error = %e, "Node sync loop ended abnormally");
    }

    served.context("HTTP server error")?;
    info!("Scale Scheduler shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C"),
        () = terminate => info!("Received SIGTERM"),
    }
}
