use std::net::SocketAddr;

use anyhow::Context;

use firmreg_api::app::{AppServices, build_app};
use firmreg_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    firmreg_observability::init();

    let config = AppConfig::from_env().context("loading configuration")?;
    let services = AppServices::from_config(&config).await?;
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        rate_limit = config.rate_limit.capacity,
        window_secs = config.rate_limit.window.as_secs(),
        "listening"
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
