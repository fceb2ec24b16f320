//! Server startup and graceful shutdown

use crate::state::AppState;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;

/// Start the server; on shutdown, drain background persistence before returning.
pub async fn start_server(state: &Arc<AppState>, app: Router) -> Result<()> {
    let settings = &state.settings;
    let addr = format!("0.0.0.0:{}", settings.server.port);
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        max_image_mb = settings.image.max_file_size_bytes / 1024 / 1024,
        storage = %settings.storage.backend,
        cdn_enabled = settings.cdn.enabled,
        watermark_enabled = settings.watermark.enabled,
        keep_origin = settings.watermark.keep_origin,
        cache_sliding_minutes = settings.image.cache_sliding_expiration_minutes,
        friendly_not_found = settings.content.use_friendly_not_found_image,
        enable_comments = settings.content.enable_comments,
        enable_word_filter = settings.content.enable_word_filter,
        post_list_page_size = settings.content.post_list_page_size,
        hot_tag_amount = settings.content.hot_tag_amount,
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.persist_queue.shutdown().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl+C (SIGINT) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully, draining background persistence...");
}
