//! nodestat: host resource snapshots with I/O throughput over HTTP.
//!
//! Run with:  `RUST_LOG=info nodestat --config ./nodestat.toml`

use anyhow::{Context, Result};
use clap::Parser;
use nodestat_system::memory::{format_bytes, MIB};
use nodestat_system::{NodeMonitor, RateConfig, RateEstimator, SysinfoProvider};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Serve host memory, disk, network and CPU metrics")]
struct Cli {
    /// Path to the TOML config file (default: $XDG_CONFIG_HOME/nodestat/nodestat.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides `server.bind`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Structured logging; RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("nodestat v{} starting", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(nodestat_config::default_path);
    let config = nodestat_config::load(&config_path)?;

    let rates = RateConfig::new(
        config.rates.history_capacity,
        config.rates.min_elapsed_secs,
        config.rates.min_rate,
    );
    let monitor = NodeMonitor::new(
        Arc::new(SysinfoProvider::new()?),
        RateEstimator::global_with(rates),
        config.system.disk_path.clone(),
    );

    // Prime the CPU baseline and the rate window before serving.
    let monitor = tokio::task::spawn_blocking(move || {
        match monitor.snapshot() {
            Ok(m) => tracing::info!(
                "host: {} ({} threads), memory {}, disk '{}' {}",
                m.cpu_model,
                m.cpu_threads,
                format_bytes(m.memory_total * MIB),
                monitor.disk_path().display(),
                format_bytes(m.disk_total * MIB),
            ),
            Err(e) => tracing::warn!("initial sample failed: {e}"),
        }
        monitor
    })
    .await?;

    let bind = cli.bind.unwrap_or(config.server.bind);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("cannot bind '{bind}'"))?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    let app = nodestat_api::router(nodestat_api::AppState::new(monitor));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("nodestat stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
