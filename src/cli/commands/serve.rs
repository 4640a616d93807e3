use anyhow::Context;

use crate::cli::open_store;
use crate::config::AppConfig;
use crate::state::AppState;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    config.validate().context("invalid configuration")?;

    let store = open_store(&config).await?;
    let bind_addr = config.bind_addr();
    tracing::info!(
        "Starting ForumHub in {:?} mode with {:?} store",
        config.environment,
        config.store
    );

    let state = AppState::new(config, store).context("failed to initialise token service")?;
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("ForumHub listening on http://{}", bind_addr);

    axum::serve(listener, crate::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
