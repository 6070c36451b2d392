use std::sync::Arc;

use anyhow::Context;

use relaygate_infra::{GatewayConfig, PolicyRefresher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    relaygate_observability::init();

    let config = GatewayConfig::from_env().context("invalid configuration")?;
    tracing::info!(?config, "starting relaygate");

    let services = Arc::new(relaygate_api::app::build_services(&config).await?);

    let refresher = config
        .policy_refresh
        .map(|interval| PolicyRefresher::new(services.policy.clone(), interval).spawn());

    let app = relaygate_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(refresher) = refresher {
        refresher.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
