use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;

use ipl_stats::config::ServerConfig;
use ipl_stats::dataset;
use ipl_stats::engine::QueryEngine;
use ipl_stats::http_api::{self, AppState};
use ipl_stats::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let config = ServerConfig::resolve(&args)?;
    logging::init(config.log_format)?;

    let source = config.source.describe();
    let tables = match dataset::load(&config.source) {
        Ok(tables) => tables,
        Err(err) => {
            tracing::error!(%source, "failed to load tables: {err:#}");
            return Err(err);
        }
    };
    tracing::info!(
        %source,
        matches = tables.matches().len(),
        deliveries = tables.deliveries().len(),
        "tables loaded"
    );

    let state = AppState {
        engine: QueryEngine::new(Arc::new(tables)),
        source,
        loaded_at: Utc::now().to_rfc3339(),
    };
    let app = http_api::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "serving IPL stats API");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}
