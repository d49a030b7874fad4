//! File-backed container source.
//!
//! Stands in for a live container-event feed such as the Docker event
//! stream: instead of subscribing to the runtime, it reads a JSON snapshot
//! of the running containers and re-reads it whenever the file changes.
//! Whatever writes the file (a runtime hook, `docker ps` in a loop, a test)
//! plays the role of the event source. A native runtime client would feed
//! the same snapshot channel the monitor consumes.
//! The snapshot is an array of containers:
//!
//! ```json
//! [{"name": "web1",
//!   "labels": {"com.chameth.vhost": "example.com"},
//!   "ports": [{"container_port": 8080, "host_port": 0}]}]
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::builder::Container;
use crate::config::DiscoveryConfig;
use crate::lifecycle::ShutdownSignal;
use crate::resilience::backoff::Backoff;

/// Errors raised by the container source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Read and parse one snapshot from disk.
pub fn load_snapshot(path: &Path) -> Result<Vec<Container>, SourceError> {
    let content = fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SourceError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Publishes container snapshots read from a watched JSON file.
pub struct FileSource {
    path: PathBuf,
    poll_interval: Duration,
    retry_base_ms: u64,
    retry_max_ms: u64,
    update_tx: mpsc::UnboundedSender<Vec<Container>>,
}

impl FileSource {
    /// Create a new source.
    ///
    /// Returns the source and a receiver for snapshots.
    pub fn new(
        path: &Path,
        config: &DiscoveryConfig,
    ) -> (Self, mpsc::UnboundedReceiver<Vec<Container>>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                poll_interval: Duration::from_millis(config.poll_interval_ms),
                retry_base_ms: config.retry_base_ms,
                retry_max_ms: config.retry_max_ms,
                update_tx,
            },
            update_rx,
        )
    }

    /// Publish the current snapshot, then a new one after every change.
    ///
    /// Unreadable or invalid snapshots are retried with backoff. Identical
    /// consecutive snapshots are published once.
    pub async fn run(self, mut shutdown: ShutdownSignal) -> Result<(), SourceError> {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let _watcher = self.watch(event_tx)?;

        let mut last: Option<Vec<Container>> = None;
        loop {
            if !self.publish_with_retry(&mut last, &mut shutdown).await {
                break;
            }

            tokio::select! {
                event = event_rx.recv() => {
                    if event.is_none() {
                        break;
                    }
                    // Editors often emit several events per save.
                    while event_rx.try_recv().is_ok() {}
                }
                _ = shutdown.recv() => break,
            }
        }

        tracing::info!(path = ?self.path, "Container source stopped");
        Ok(())
    }

    /// Load until it succeeds, publishing changed snapshots.
    /// Returns false if shutdown fired or the receiver went away.
    async fn publish_with_retry(
        &self,
        last: &mut Option<Vec<Container>>,
        shutdown: &mut ShutdownSignal,
    ) -> bool {
        let mut backoff = Backoff::new(self.retry_base_ms, self.retry_max_ms);
        loop {
            match load_snapshot(&self.path) {
                Ok(containers) => {
                    if last.as_ref() == Some(&containers) {
                        tracing::debug!(path = ?self.path, "Container snapshot unchanged");
                        return true;
                    }
                    *last = Some(containers.clone());
                    return self.update_tx.send(containers).is_ok();
                }
                Err(e) => {
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        error = %e,
                        attempt = backoff.attempt(),
                        retry_in_ms = delay.as_millis() as u64,
                        "Failed to load container snapshot"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = shutdown.recv() => return false,
                    }
                }
            }
        }
    }

    /// Watch the parent directory so atomic replaces are seen too.
    fn watch(&self, event_tx: mpsc::UnboundedSender<()>) -> Result<RecommendedWatcher, SourceError> {
        let watch_err = |source| SourceError::Watch {
            path: self.path.clone(),
            source,
        };

        let file_name = self.path.file_name().map(|name| name.to_os_string());
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = event.kind.is_modify()
                        || event.kind.is_create()
                        || event.kind.is_remove();
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if relevant && ours {
                        tracing::debug!("Container snapshot change detected");
                        let _ = event_tx.send(());
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )
        .map_err(watch_err)?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(watch_err)?;

        tracing::info!(path = ?self.path, "Container source watching");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::labels::LABEL_VHOST;
    use crate::lifecycle::Shutdown;

    const SNAPSHOT: &str = r#"[
        {"name": "web1",
         "labels": {"com.chameth.vhost": "example.com", "com.chameth.proxy": "8080"},
         "ports": [{"container_port": 80, "host_port": 0}]},
        {"name": "db"}
    ]"#;

    #[test]
    fn parses_snapshot_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("containers.json");
        fs::write(&path, SNAPSHOT).unwrap();

        let containers = load_snapshot(&path).unwrap();
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[0].label(LABEL_VHOST), Some("example.com"));
        assert_eq!(containers[0].ports[0].container_port, 80);
        assert!(containers[1].labels.is_empty());
        assert!(containers[1].ports.is_empty());
    }

    #[test]
    fn reports_missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(load_snapshot(&missing), Err(SourceError::Io { .. })));

        let invalid = dir.path().join("invalid.json");
        fs::write(&invalid, "{not json").unwrap();
        assert!(matches!(load_snapshot(&invalid), Err(SourceError::Parse { .. })));
    }

    #[tokio::test]
    async fn publishes_initial_snapshot_then_stops_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("containers.json");
        fs::write(&path, SNAPSHOT).unwrap();

        let (source, mut rx) = FileSource::new(&path, &DiscoveryConfig::default());
        let shutdown = Shutdown::new();
        let task = tokio::spawn(source.run(shutdown.subscribe()));

        let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.len(), 2);

        shutdown.trigger();
        let result = tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn retries_until_file_appears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("containers.json");

        let config = DiscoveryConfig {
            retry_base_ms: 20,
            retry_max_ms: 50,
            ..DiscoveryConfig::default()
        };
        let (source, mut rx) = FileSource::new(&path, &config);
        let shutdown = Shutdown::new();
        tokio::spawn(source.run(shutdown.subscribe()));

        tokio::time::sleep(Duration::from_millis(100)).await;
        fs::write(&path, "[]").unwrap();

        let snapshot = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(snapshot.is_empty());
    }
}
