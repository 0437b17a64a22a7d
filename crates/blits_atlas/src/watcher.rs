//! Manifest change handling.

use std::path::PathBuf;
use std::sync::Weak;
use std::time::Duration;

use blits_carton::KeyedDebouncer;
use tokio::task::JoinHandle;

use crate::host::{ManifestWatch, WatchEvent};
use crate::registry::{ManifestChange, ProjectRegistry};

/// Feeds manifest events into a [`ProjectRegistry`].
///
/// Events are debounced per manifest path, so a burst of writes to one
/// manifest is handled once while different manifests proceed independently.
/// Only a weak reference to the registry is held; once the registry is gone
/// pending work is dropped.
pub struct ChangeWatcher {
    registry: Weak<ProjectRegistry>,
    debouncer: KeyedDebouncer<PathBuf>,
}

impl ChangeWatcher {
    pub fn new(registry: Weak<ProjectRegistry>, delay: Duration) -> Self {
        Self {
            registry,
            debouncer: KeyedDebouncer::new(delay),
        }
    }

    /// Schedule handling of a single event.
    pub fn handle(&self, event: WatchEvent) {
        tracing::debug!(?event, "manifest event");

        let path = event.path().to_path_buf();
        let registry = self.registry.clone();
        let manifest_path = path.clone();

        self.debouncer.schedule(path, async move {
            let Some(registry) = registry.upgrade() else {
                return;
            };
            match registry.apply_manifest_change(&manifest_path).await {
                ManifestChange::Unchanged => {}
                change => tracing::info!(?change, "project registry updated"),
            }
        });
    }

    /// Drive the watcher until the subscription ends.
    pub fn spawn(self, mut watch: ManifestWatch) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = watch.events.recv().await {
                if self.registry.strong_count() == 0 {
                    break;
                }
                self.handle(event);
            }
            tracing::debug!("manifest watch ended");
        })
    }
}
