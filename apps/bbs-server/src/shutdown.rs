//! Termination signals for graceful shutdown.

use tokio::signal;
use tracing::{error, info};

/// Resolves on Ctrl+C or, on unix, SIGTERM.
///
/// A handler that cannot be installed never resolves, so the other signal
/// still works and the server keeps running.
pub async fn signal_received() {
    tokio::select! {
        () = ctrl_c() => info!("Received Ctrl+C"),
        () = sigterm() => info!("Received SIGTERM"),
    }
    info!("Shutting down, draining open connections");
}

async fn ctrl_c() {
    if let Err(e) = signal::ctrl_c().await {
        error!(%e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn sigterm() {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut handler) => {
            handler.recv().await;
        }
        Err(e) => {
            error!(%e, "Failed to install SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn sigterm() {
    std::future::pending::<()>().await;
}
