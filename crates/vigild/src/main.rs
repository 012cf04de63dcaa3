//! vigild - Vigil monitoring daemon
//!
//! This binary assembles the observability core, starts its periodic tasks,
//! and serves the REST API until interrupted.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use vigil_api::ApiServer;
use vigil_core::{Monitor, MonitorConfig};
use vigil_metrics::RuntimeMetricsCollector;

#[derive(Parser)]
#[command(name = "vigild")]
#[command(about = "Vigil monitoring daemon")]
#[command(version)]
struct Cli {
    /// Address to bind the HTTP API to (overrides VIGIL_BIND_ADDR)
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Enable development mode (full error detail in responses)
    #[arg(long)]
    dev: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("vigil=info".parse()?))
        .init();

    let cli = Cli::parse();

    let mut config = MonitorConfig::from_env();
    if let Some(bind) = cli.bind {
        config = config.with_bind_addr(bind);
    }
    if cli.dev {
        config = config.with_dev_mode(true);
    }
    let bind_addr = config.bind_addr;

    let monitor = Monitor::new(config);
    monitor.install_error_hooks();
    monitor.add_collector(Arc::new(RuntimeMetricsCollector::new()));
    monitor.start();

    let server = ApiServer::new(monitor.clone());

    info!(addr = %bind_addr, "vigild starting");

    let shutdown_monitor = monitor.clone();
    let result = server
        .serve_with_shutdown(bind_addr, async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
            shutdown_monitor.stop();
        })
        .await;

    monitor.stop();
    result?;

    Ok(())
}
