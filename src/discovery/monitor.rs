//! Container monitor: snapshot in, broadcast out.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::broadcast::BroadcastServer;
use crate::builder::{self, Container};
use crate::discovery::filter::LabelFilter;
use crate::lifecycle::ShutdownSignal;

/// Turns each container snapshot into a configuration document and hands it
/// to the broadcast server.
pub struct Monitor {
    server: Arc<BroadcastServer>,
    filter: LabelFilter,
    route_extras: String,
}

impl Monitor {
    pub fn new(server: Arc<BroadcastServer>, filter: LabelFilter, route_extras: impl Into<String>) -> Self {
        Self {
            server,
            filter,
            route_extras: route_extras.into(),
        }
    }

    /// Handle a single snapshot. Returns the generated document.
    pub async fn handle(&self, containers: Vec<Container>) -> String {
        let containers = self.filter.apply(containers);
        tracing::info!(count = containers.len(), "Container change detected");

        let config = builder::build(&containers, &self.route_extras);
        tracing::debug!(config = %config, "Generated config");

        let report = self.server.broadcast(&config).await;
        tracing::debug!(
            delivered = report.delivered,
            failed = report.failed,
            "Broadcast complete"
        );
        config
    }

    /// Process snapshots until the source closes or shutdown fires.
    ///
    /// Snapshots are handled one at a time, so broadcasts never overlap.
    pub async fn run(
        self,
        mut snapshots: mpsc::UnboundedReceiver<Vec<Container>>,
        mut shutdown: ShutdownSignal,
    ) {
        tracing::info!("Starting container monitoring");
        loop {
            tokio::select! {
                snapshot = snapshots.recv() => match snapshot {
                    Some(containers) => {
                        self.handle(containers).await;
                    }
                    None => {
                        tracing::warn!("Container source closed");
                        break;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
