use core_config::tracing::{init_tracing, install_color_eyre};
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use wechat_mcp::{AppState, DraftPublisher, HttpWeChatApi};

mod config;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Held for the process lifetime so the diagnostic log flushes on shutdown
    let _log_guard = init_tracing(&config.environment);

    let api = match &config.wechat.api_base {
        Some(base) => {
            info!("Using WeChat API base {base}");
            HttpWeChatApi::with_base_url(base)?
        }
        None => HttpWeChatApi::new()?,
    };

    let publisher = Arc::new(DraftPublisher::new(Arc::new(api), config.wechat.clone()));
    let app = wechat_mcp::router(AppState::new(publisher));

    let listener = tokio::net::TcpListener::bind(config.server.address()).await?;
    info!("MCP endpoint ready on http://{}/mcp", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        })?;

    info!("Shutdown complete");
    Ok(())
}

/// Completes on SIGINT or SIGTERM, letting in-flight requests drain.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully");
        },
    }
}
