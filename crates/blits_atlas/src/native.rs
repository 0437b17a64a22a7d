//! File-system backed [`WorkspaceHost`].

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use walkdir::WalkDir;

use crate::host::{GlobFilter, HostError, ManifestWatch, WatchEvent, WorkspaceHost};

/// Workspace host over the local file system.
///
/// Roots can be replaced after construction, since a language server only
/// learns them at `initialize`.
#[derive(Debug, Default)]
pub struct NativeHost {
    roots: RwLock<Vec<PathBuf>>,
}

impl NativeHost {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots: RwLock::new(roots),
        }
    }

    pub fn set_roots(&self, roots: Vec<PathBuf>) {
        *self.roots.write() = roots;
    }
}

#[async_trait]
impl WorkspaceHost for NativeHost {
    fn roots(&self) -> Vec<PathBuf> {
        self.roots.read().clone()
    }

    async fn find_files(&self, include: &str, exclude: &str, limit: usize) -> Vec<PathBuf> {
        let filter = match GlobFilter::new(include, exclude) {
            Ok(filter) => filter,
            Err(err) => {
                tracing::warn!("invalid search pattern: {}", err);
                return Vec::new();
            }
        };
        let roots = self.roots();

        match tokio::task::spawn_blocking(move || walk_matching(&roots, &filter, limit)).await {
            Ok(files) => files,
            Err(err) => {
                tracing::warn!("workspace scan failed: {}", err);
                Vec::new()
            }
        }
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    fn read_to_string_sync(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn watch(&self, include: &str, exclude: &str) -> Result<ManifestWatch, HostError> {
        let filter = GlobFilter::new(include, exclude)?;
        let roots = self.roots();
        let (tx, rx) = mpsc::unbounded_channel();

        let watched_roots = roots.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for watch_event in convert_event(event, &watched_roots, &filter) {
                        let _ = tx.send(watch_event);
                    }
                }
                Err(err) => tracing::warn!("watch error: {}", err),
            },
            Config::default(),
        )?;

        for root in &roots {
            if root.exists() {
                watcher.watch(root, RecursiveMode::Recursive)?;
            }
        }

        tracing::debug!(roots = roots.len(), "watching manifests");
        Ok(ManifestWatch::new(rx, watcher))
    }
}

fn walk_matching(roots: &[PathBuf], filter: &GlobFilter, limit: usize) -> Vec<PathBuf> {
    let mut found = Vec::new();

    for root in roots {
        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                !entry.file_type().is_dir()
                    || entry
                        .path()
                        .strip_prefix(root)
                        .map(|relative| !filter.prunes_dir(relative))
                        .unwrap_or(true)
            });

        for entry in walker.filter_map(Result::ok) {
            if found.len() >= limit {
                return found;
            }
            if !entry.file_type().is_file() {
                continue;
            }
            let selected = entry
                .path()
                .strip_prefix(root)
                .map(|relative| filter.matches(relative))
                .unwrap_or(false);
            if selected {
                found.push(entry.into_path());
            }
        }
    }

    found
}

fn convert_event(event: Event, roots: &[PathBuf], filter: &GlobFilter) -> Vec<WatchEvent> {
    let make: fn(PathBuf) -> WatchEvent = match event.kind {
        EventKind::Create(_) => WatchEvent::Created,
        EventKind::Modify(_) => WatchEvent::Changed,
        EventKind::Remove(_) => WatchEvent::Deleted,
        _ => return Vec::new(),
    };

    event
        .paths
        .into_iter()
        .filter(|path| filter.matches_under(roots, path))
        .map(make)
        .collect()
}
