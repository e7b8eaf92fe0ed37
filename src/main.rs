use anyhow::Context;
use clap::Parser;
use pp_exporter::api::create_router;
use pp_exporter::config::{Args, ExporterConfig};
use pp_exporter::logging::init_logging;
use pp_exporter::metrics::{install_recorder, PrometheusSink};
use pp_exporter::stats::{HttpSnapshotSource, Poller};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let args = Args::parse();
    let config = match ExporterConfig::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Starting PP Exporter on {}{}",
        config.listen_addr,
        config.endpoint
    );

    let handle = install_recorder().context("Failed to install metrics recorder")?;

    let source = HttpSnapshotSource::new(config.url.clone(), config.timeout)
        .context("Failed to build upstream client")?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = Poller::new(source, PrometheusSink, config.interval).spawn(shutdown_rx);

    let app = create_router(handle, &config.endpoint);
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    let _ = shutdown_tx.send(true);
    poller.await.context("Stats poller panicked")?;

    tracing::info!("PP Exporter stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
