//! HTTP server lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::routes::api_router;
use crate::state::AppState;

/// Bind `addr` and serve the API until Ctrl-C.
pub async fn run_server(state: Arc<AppState>, addr: SocketAddr) -> Result<()> {
    let app = api_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
