//! In-memory [`WorkspaceHost`] for tests and embedding.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::host::{GlobFilter, HostError, ManifestWatch, WatchEvent, WorkspaceHost};

/// Workspace host whose files live in a map.
///
/// Watch subscribers only hear about events passed to [`MemoryHost::emit`];
/// writes and removals are silent so tests control timing explicitly.
#[derive(Default)]
pub struct MemoryHost {
    roots: RwLock<Vec<PathBuf>>,
    files: RwLock<BTreeMap<PathBuf, String>>,
    watchers: Mutex<Vec<UnboundedSender<WatchEvent>>>,
    find_calls: AtomicUsize,
}

impl MemoryHost {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots: RwLock::new(roots),
            ..Default::default()
        }
    }

    pub fn set_roots(&self, roots: Vec<PathBuf>) {
        *self.roots.write() = roots;
    }

    pub fn write(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.write().insert(path.into(), content.into());
    }

    pub fn remove(&self, path: &Path) {
        self.files.write().remove(path);
    }

    /// Deliver an event to every live watch subscription.
    pub fn emit(&self, event: WatchEvent) {
        self.watchers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// How many workspace scans have been requested.
    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    /// Number of live watch subscriptions.
    pub fn watcher_count(&self) -> usize {
        let mut watchers = self.watchers.lock();
        watchers.retain(|tx| !tx.is_closed());
        watchers.len()
    }
}

#[async_trait]
impl WorkspaceHost for MemoryHost {
    fn roots(&self) -> Vec<PathBuf> {
        self.roots.read().clone()
    }

    async fn find_files(&self, include: &str, exclude: &str, limit: usize) -> Vec<PathBuf> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        // Give concurrent callers a chance to interleave.
        tokio::task::yield_now().await;

        let Ok(filter) = GlobFilter::new(include, exclude) else {
            return Vec::new();
        };
        let roots = self.roots();

        self.files
            .read()
            .keys()
            .filter(|path| filter.matches_under(&roots, path))
            .take(limit)
            .cloned()
            .collect()
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        tokio::task::yield_now().await;
        self.read_to_string_sync(path)
    }

    fn read_to_string_sync(&self, path: &Path) -> io::Result<String> {
        self.files.read().get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().contains_key(path)
    }

    fn watch(&self, include: &str, exclude: &str) -> Result<ManifestWatch, HostError> {
        GlobFilter::new(include, exclude)?;
        let (tx, rx) = mpsc::unbounded_channel();
        self.watchers.lock().push(tx);
        Ok(ManifestWatch::new(rx, ()))
    }
}
