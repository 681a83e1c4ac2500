//! Pipeline Sentinel service binary.
//!
//! Wires the monitor to the simulated collaborators, starts the scheduled
//! check loop, and serves the HTTP API until Ctrl-C.
//!
//! # Environment Variables
//!
//! - `SENTINEL_CONFIG`: Path to a TOML config file
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pipeline_sentinel::api::create_app;
use pipeline_sentinel::config::MonitorConfig;
use pipeline_sentinel::monitor::PipelineMonitor;

#[derive(Parser, Debug)]
#[command(name = "pipeline-sentinel")]
#[command(about = "Publishing pipeline health monitoring and recovery service")]
#[command(version)]
struct CliArgs {
    /// Override the HTTP listen address (default from config, "0.0.0.0:8090")
    #[arg(short, long)]
    addr: Option<String>,

    /// Path to a TOML config file (overrides SENTINEL_CONFIG lookup)
    #[arg(long)]
    config: Option<String>,

    /// Override the check interval in seconds
    #[arg(long)]
    interval: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => MonitorConfig::load_from(std::path::Path::new(path)),
        None => MonitorConfig::load(),
    };
    if let Some(interval) = args.interval {
        config.check_interval_secs = interval;
    }
    if let Some(addr) = args.addr {
        config.listen_addr = addr;
    }
    let listen_addr = config.listen_addr.clone();

    // Simulated probes and recovery runner; production deployments inject
    // real clients through PipelineMonitor::builder.
    let monitor = PipelineMonitor::new(config);
    monitor.start_monitoring().await;

    let app = create_app(monitor.clone());
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;
    info!(addr = %listen_addr, "Pipeline Sentinel API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    monitor.stop_monitoring().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
