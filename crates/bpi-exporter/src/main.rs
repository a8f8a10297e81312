//! BPI exporter
//!
//! - Refreshes the Bitcoin Price Index on a fixed interval
//! - Exposes one gauge per currency on `GET /metrics`
//! - Keeps last known rates through upstream failures
//! - Drains in-flight scrapes on SIGINT/SIGTERM

use std::process::ExitCode;

use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use bpi_core::error::{ExporterError, Result};
use bpi_exporter::{app_state::AppState, config, router, shutdown};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
    tracing::info!("logger initialized");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(kind = e.kind().as_str(), error = %e, "bpi-exporter exiting");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cfg = config::load(std::env::args().nth(1))?;
    let listen = cfg.exporter.listen_addr()?;

    let state = AppState::new(cfg);
    let scheduler = state.scheduler()?;

    // The exporter is useless without its listener: bind failure is fatal.
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| ExporterError::Internal(format!("failed to bind {listen}: {e}")))?;

    let metrics = state.metrics();
    tracing::info!(
        %listen,
        upstream = %state.cfg().upstream.url,
        metric = metrics.rate_name(),
        "bpi-exporter starting"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresh = tokio::spawn(scheduler.run(shutdown_rx));

    let app = router::build_router(state.clone());
    let drain = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown::signal().await;
            drain.set_draining();
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| ExporterError::Internal(format!("server failed: {e}")))?;

    if let Err(e) = refresh.await {
        tracing::error!(error = %e, "scheduler task failed");
    }
    tracing::info!("bpi-exporter stopped");
    Ok(())
}
