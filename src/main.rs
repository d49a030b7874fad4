//! centauri-broadcast
//!
//! ```text
//!   containers.json ──▶ FileSource ──▶ Monitor ──▶ builder::build
//!                                         │
//!                                         ▼
//!                                  BroadcastServer ──▶ proxy 1
//!                                   (last payload)  ──▶ proxy 2
//!                                                   ──▶ ...
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use centauri_broadcast::cli::Cli;
use centauri_broadcast::discovery::{FileSource, LabelFilter, Monitor};
use centauri_broadcast::lifecycle::{signals, Shutdown};
use centauri_broadcast::observability::{logging, metrics};
use centauri_broadcast::BroadcastServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().resolve()?;

    logging::init_logging(&config.observability);
    tracing::info!("centauri-broadcast v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        send_timeout_ms = ?config.listener.send_timeout_ms,
        proxytag = ?config.discovery.proxytag,
        "Configuration loaded"
    );

    // The snapshot file takes the place of a container runtime event feed.
    let containers_path = config
        .discovery
        .containers_path
        .clone()
        .map(PathBuf::from)
        .ok_or("no container snapshot configured (--containers or discovery.containers_path)")?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let server = Arc::new(BroadcastServer::new(config.listener.clone()));
    if let Err(e) = server.start(shutdown.subscribe()).await {
        tracing::error!(error = %e, "Failed to start server");
        return Err(e.into());
    }

    let (source, snapshots) = FileSource::new(&containers_path, &config.discovery);
    let source_task = tokio::spawn(source.run(shutdown.subscribe()));

    let monitor = Monitor::new(
        Arc::clone(&server),
        LabelFilter::new(config.discovery.proxytag.clone()),
        config.routes.extras.clone(),
    );
    monitor.run(snapshots, shutdown.subscribe()).await;

    // Stops the source too when the monitor exited because the source closed.
    shutdown.trigger();
    match source_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Container source failed");
            return Err(e.into());
        }
        Err(e) => {
            tracing::error!(error = %e, "Container source task panicked");
            return Err(e.into());
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
