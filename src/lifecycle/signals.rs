//! OS signal handling.

/// Resolve on Ctrl+C. If the handler cannot be installed, never resolve so
/// the server keeps running until shut down another way.
pub async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
