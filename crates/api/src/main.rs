use std::sync::Arc;

use anyhow::Context;

use taxifleet_api::app::{self, AppServices};
use taxifleet_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    taxifleet_observability::init();

    let config = AppConfig::from_env()?;
    tracing::info!(environment = %config.environment, auth = ?config.auth, "configuration loaded");

    let services = AppServices::in_memory(&config.auth).context("failed to build services")?;
    if config.seed_demo {
        match services.seed_demo().context("failed to seed demo data")? {
            Some(tenant) => tracing::info!(tenant_id = %tenant.id, subdomain = %tenant.subdomain, "demo data seeded"),
            None => tracing::info!("demo data already present"),
        }
    }

    let app = app::build_app(Arc::new(services));

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
