//! Server loop with graceful shutdown

use std::future::IntoFuture;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Serve `app` until `shutdown` is cancelled
///
/// After cancellation no new connections are accepted and in-flight
/// requests get up to `shutdown_timeout` to finish.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
    shutdown_timeout: Duration,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(address = %addr, "HTTP server listening");
    }

    let token = shutdown.clone();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move { token.cancelled().await })
        .into_future();
    let mut server = std::pin::pin!(server);

    tokio::select! {
        result = &mut server => return result,
        _ = shutdown.cancelled() => {
            tracing::info!("Shutdown requested, draining in-flight requests");
        }
    }

    match tokio::time::timeout(shutdown_timeout, server).await {
        Ok(result) => {
            tracing::info!("HTTP server stopped");
            result
        }
        Err(_) => {
            tracing::warn!(
                timeout = ?shutdown_timeout,
                "In-flight requests did not finish before shutdown timeout"
            );
            Ok(())
        }
    }
}

/// Cancel `token` on Ctrl-C
pub async fn shutdown_on_ctrl_c(token: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl-C");
            token.cancel();
        }
        Err(e) => tracing::warn!(error = %e, "Failed to listen for Ctrl-C"),
    }
}
