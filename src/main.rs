#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Veilstake node entrypoint (systemd-friendly).
//! Loads pools from config, opens the ledger and serves HTTP until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use veilstake::api::http;
use veilstake::core::config::ServiceConfig;
use veilstake::core::economics::service::StakingService;
use veilstake::monitoring::logging::{init_tracing, LogFormat};
use veilstake::monitoring::metrics::Metrics;

fn env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "ctrl-c handler failed; shutting down");
    }
    info!("shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::from_env());

    let config_path = env("VEILSTAKE_CONFIG", "config/veilstake.toml");
    let cfg = ServiceConfig::load(&config_path).with_context(|| format!("loading {config_path}"))?;

    info!(
        service = %cfg.service.name,
        pools = cfg.pools.len(),
        version = env!("CARGO_PKG_VERSION"),
        built = option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
        rustc = option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown"),
        "veilstake starting"
    );

    let metrics = Metrics::new().context("metrics init")?;
    let svc = Arc::new(StakingService::from_config(&cfg, metrics).context("service init")?);

    let listener = tokio::net::TcpListener::bind(&cfg.http.listen_addr)
        .await
        .with_context(|| format!("binding {}", cfg.http.listen_addr))?;
    info!(listen_addr = %cfg.http.listen_addr, "http listening");

    axum::serve(listener, http::router(svc))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")?;

    info!("veilstake stopped");
    Ok(())
}
